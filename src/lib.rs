//! Lazy, composable sequences with explicit retention.
//!
//! The core lives in [`seq`]; [`math`] builds number sequences on top of it and the
//! binary's problems (dispatched through [`infra`]) compose them.

pub mod error;
pub mod infra;
pub mod math;
pub mod seq;
pub mod value;

pub use error::{Result, SeqError};
pub use seq::{Options, Retention, Sequence, Source, State, sequence_of};
pub use value::{Num, Shrink, Value};
