//! The problem registry and the argument binding shared by every problem.
//!
//! `build.rs` turns each `problems/pNNN.rs` into a module and an [`Entry`]; a problem
//! file declares its typed arguments through [`problem!`](crate::problem).

use std::{collections::HashMap, fmt::Display, str::FromStr};

use anyhow::{Result, anyhow, bail};

mod problems {
    include!(concat!(env!("OUT_DIR"), "/problems_mod.rs"));
}

mod registry {
    use super::{Entry, problems};

    include!(concat!(env!("OUT_DIR"), "/registry.rs"));
}

pub type Solver = fn(&[String]) -> Result<String>;

/// One registered problem.
#[derive(Clone, Copy)]
pub struct Entry {
    pub id: &'static str,
    /// First line of the problem file's `//!` header.
    pub about: &'static str,
    pub solve: Solver,
}

/// Every registered problem, ordered by number.
pub fn entries() -> &'static [Entry] {
    registry::REGISTRY
}

pub fn ids() -> impl Iterator<Item = &'static str> {
    entries().iter().map(|e| e.id)
}

pub fn dispatch(id: &str, args: &[String]) -> Result<String> {
    let entry = entries()
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow!("unknown problem `{id}`"))?;
    (entry.solve)(args)
}

/// `--name value`, `--name=value` and bare `--flag` arguments, grouped by name.
pub struct Args<'a> {
    values: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Args<'a> {
    /// Groups `argv` by name, rejecting positionals and names outside `allowed`.
    pub fn parse(argv: &'a [String], allowed: &[&str]) -> Result<Self> {
        let mut values: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut rest = argv.iter().peekable();
        while let Some(arg) = rest.next() {
            let Some(name) = arg.strip_prefix("--") else {
                bail!("positional not allowed: {arg}");
            };
            let (name, value) = match name.split_once('=') {
                Some((name, value)) => (name, value),
                None => match rest.next_if(|next| !next.starts_with('-')) {
                    Some(value) => (name, value.as_str()),
                    None => (name, "true"),
                },
            };
            if !allowed.contains(&name) {
                bail!("unknown arg `--{name}`");
            }
            values.entry(name).or_default().push(value);
        }
        Ok(Args { values })
    }

    fn one(&self, name: &str) -> Result<Option<&'a str>> {
        match self.values.get(name).map(Vec::as_slice) {
            None => Ok(None),
            Some([value]) => Ok(Some(*value)),
            Some(_) => bail!("`--{name}` expects one value"),
        }
    }

    pub fn optional<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.one(name)?
            .map(|v| v.parse().map_err(|e| anyhow!("bad `--{name}`: {e}")))
            .transpose()
    }

    pub fn required<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(name)?
            .ok_or_else(|| anyhow!("missing `--{name}`"))
    }

    /// Every value given for a repeatable argument.
    pub fn all<T>(&self, name: &str) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let values = self.values.get(name).map(Vec::as_slice).unwrap_or_default();
        values
            .iter()
            .map(|v| v.parse().map_err(|e| anyhow!("bad `--{name}`: {e}")))
            .collect()
    }

    /// Present means true; `--name=false` is also accepted.
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.one(name)? {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(_) => bail!("`--{name}` expects no value or =true/false"),
        }
    }
}

/// Declares a problem's typed arguments and body.
///
/// Generates `solve(&[String])`, which binds `--name value` arguments and runs the body
/// inside a `solve` span, and a test-only `solve_raw` taking the arguments directly.
/// Argument types are a plain type, `bool`, `Option<T>` or `Vec<T>`.
#[macro_export]
macro_rules! problem {
    ( ( $( $name:ident : $kind:ident $(< $inner:ty >)? ),* $(,)? ) { $($body:tt)* } ) => {
        #[cfg(test)]
        pub fn solve_raw( $( $name : $kind $(< $inner >)? ),* ) -> ::anyhow::Result<::std::string::String> {
            $($body)*
        }

        pub fn solve(argv: &[::std::string::String]) -> ::anyhow::Result<::std::string::String> {
            let args = $crate::infra::Args::parse(argv, &[$( stringify!($name) ),*])?;
            $( let $name = $crate::problem!(@bind args, $name, $kind $(< $inner >)?); )*

            let problem = module_path!().rsplit("::").next().unwrap_or_default();
            let span = ::tracing::info_span!("solve", problem, $( $name = ?&$name ),*);
            let started = ::std::time::Instant::now();
            let answer = span.in_scope(|| -> ::anyhow::Result<::std::string::String> { $($body)* })?;
            Ok(format!("Answer: {answer} | took {:.6} seconds", started.elapsed().as_secs_f64()))
        }
    };

    (@bind $args:ident, $name:ident, bool) => {
        $args.flag(stringify!($name))?
    };
    (@bind $args:ident, $name:ident, Option<$t:ty>) => {
        $args.optional::<$t>(stringify!($name))?
    };
    (@bind $args:ident, $name:ident, Vec<$t:ty>) => {
        $args.all::<$t>(stringify!($name))?
    };
    (@bind $args:ident, $name:ident, $t:ty) => {
        $args.required::<$t>(stringify!($name))?
    };
}
