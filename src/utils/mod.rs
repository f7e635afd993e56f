mod command;
mod config;
mod error;
mod outcome;

pub use command::{CommandExecutor, ExecutionResult, Executor};
pub use config::{Params, Subcommand, GVM_ROOT_ENV};
pub use error::Result;
pub use outcome::{AliasTable, Data, Outcome, Report, VersionSet};

#[cfg(test)]
pub use command::MockExecutor;
#[cfg(test)]
pub use error::GvmError;
