use std::collections::BTreeMap;

use serde::Serialize;

use super::command::ExecutionResult;
use super::error::GvmError;

/// Installed or available Go versions, in the order gvm printed them.
pub type VersionSet = Vec<String>;

/// Alias name to Go version.
pub type AliasTable = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    Versions(VersionSet),
    Aliases(AliasTable),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub stdout: String,
    pub stderr: String,
    pub data: Option<Data>,
}

impl Report {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Report {
            stdout: stdout.into(),
            stderr: stderr.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Changed(Report),
    Unchanged(Report),
    Failed {
        msg: String,
        stdout: String,
        stderr: String,
    },
}

impl Outcome {
    /// Map a mutating gvm call: exit 0 is a change, anything else a failure.
    pub fn from_mutation(result: ExecutionResult) -> Self {
        if result.success() {
            Outcome::Changed(Report::new(result.stdout, result.stderr))
        } else {
            Outcome::failed_run(result)
        }
    }

    /// A failed gvm call, reported with its stderr as the message.
    pub fn failed_run(result: ExecutionResult) -> Self {
        Outcome::Failed {
            msg: result.stderr.clone(),
            stdout: result.stdout,
            stderr: result.stderr,
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Outcome::Failed {
            msg: msg.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn stdout(&self) -> &str {
        match self {
            Outcome::Changed(report) | Outcome::Unchanged(report) => &report.stdout,
            Outcome::Failed { stdout, .. } => stdout,
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            Outcome::Changed(report) | Outcome::Unchanged(report) => &report.stderr,
            Outcome::Failed { stderr, .. } => stderr,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&ModuleResult::from(self))
    }
}

impl From<GvmError> for Outcome {
    fn from(err: GvmError) -> Self {
        Outcome::failed(err.to_string())
    }
}

/// The JSON object the automation engine reads back.
#[derive(Debug, Serialize)]
struct ModuleResult<'a> {
    changed: bool,
    failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<&'a str>,
    stdout: &'a str,
    stderr: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    versions: Option<&'a VersionSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aliases: Option<&'a AliasTable>,
}

impl<'a> From<&'a Outcome> for ModuleResult<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        let (msg, data) = match outcome {
            Outcome::Changed(report) | Outcome::Unchanged(report) => {
                (None, report.data.as_ref())
            }
            Outcome::Failed { msg, .. } => (Some(msg.as_str()), None),
        };

        ModuleResult {
            changed: outcome.is_changed(),
            failed: outcome.is_failed(),
            msg,
            stdout: outcome.stdout(),
            stderr: outcome.stderr(),
            versions: match data {
                Some(Data::Versions(versions)) => Some(versions),
                _ => None,
            },
            aliases: match data {
                Some(Data::Aliases(aliases)) => Some(aliases),
                _ => None,
            },
        }
    }
}
