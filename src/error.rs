/// Failures surfaced by sequence access and materialization.
///
/// All of these are contract violations by the caller, not transient conditions, so
/// nothing inside the engine retries them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeqError {
    /// The producer finished before reaching `index`.
    #[error("index {index} out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A full drain ran past the safety cap without the source finishing.
    #[error("materialization did not finish within {limit} pulls; is the source unbounded?")]
    UnboundedMaterialization { limit: usize },

    /// The sequence was advanced from inside its own producer.
    #[error("re-entrant access: sequence pulled while it is already being advanced")]
    ReentrantAccess,

    /// Retention may only change before the first pull.
    #[error("retention policy cannot change after the sequence has started producing")]
    InvalidRetentionTransition,

    /// `index` sits below the cursor and is no longer retained.
    #[error("index {index} is no longer retained (cursor at {cursor})")]
    Evicted { index: usize, cursor: usize },
}

pub type Result<T> = std::result::Result<T, SeqError>;
