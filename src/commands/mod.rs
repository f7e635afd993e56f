mod alias;
mod install;
mod list;

use alias::{AliasCreateCommand, AliasDeleteCommand, AliasListCommand};
use install::{InstallCommand, InstallFlags, UninstallCommand};
use list::{ListCommand, VersionQuery};

use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

use crate::utils::{ExecutionResult, Executor, Outcome, Params, Result, Subcommand, GVM_ROOT_ENV};

/// Output of a read-only gvm query, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: T,
    pub stdout: String,
    pub stderr: String,
}

/// A parsed listing, or the failed run that should have produced it.
pub type Query<T> = std::result::Result<Listing<T>, ExecutionResult>;

/// The gvm binary under one root, plus the environment every call gets.
pub struct Gvm<'a> {
    executor: &'a dyn Executor,
    program: String,
    env: HashMap<String, String>,
}

impl<'a> Gvm<'a> {
    pub fn new(executor: &'a dyn Executor, root: &str) -> Self {
        let program = Path::new(root)
            .join("bin")
            .join("gvm")
            .to_string_lossy()
            .into_owned();

        let mut env = HashMap::new();
        env.insert(GVM_ROOT_ENV.to_string(), root.to_string());

        Gvm {
            executor,
            program,
            env,
        }
    }

    pub fn run(&self, args: &[&str]) -> Result<ExecutionResult> {
        let argv: Vec<String> = std::iter::once(self.program.clone())
            .chain(args.iter().map(|arg| arg.to_string()))
            .collect();

        info!(argv = ?argv, "running gvm");
        let result = self.executor.run(&argv, &self.env)?;
        if !result.success() {
            warn!(exit_code = result.exit_code, stderr = %result.stderr.trim(), "gvm exited with an error");
        }
        Ok(result)
    }
}

/// Turns one parameter set into at most two gvm invocations and an outcome.
pub struct CommandAdapter<E: Executor> {
    executor: E,
    env_root: Option<String>,
}

impl<E: Executor> CommandAdapter<E> {
    pub fn new(executor: E) -> Self {
        CommandAdapter {
            executor,
            env_root: None,
        }
    }

    /// Value of `GVM_ROOT` to fall back on when `gvm_root` is not given.
    pub fn with_env_root(mut self, env_root: Option<String>) -> Self {
        self.env_root = env_root;
        self
    }

    pub fn execute(&self, params: &Params) -> Outcome {
        match self.try_execute(params) {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_configuration() {
                    warn!(error = %e, "invalid parameters");
                } else {
                    error!(error = %e, "gvm could not be run");
                }
                Outcome::from(e)
            }
        }
    }

    pub fn try_execute(&self, params: &Params) -> Result<Outcome> {
        let root = params.resolve_root(self.env_root.as_deref())?;
        info!(root = %root, subcommand = %params.subcommand, "resolved gvm root");

        let gvm = Gvm::new(&self.executor, &root);

        match params.subcommand {
            Subcommand::Install => {
                InstallCommand::new(params.require_version()?, InstallFlags::from(params))
                    .execute(&gvm)
            }
            Subcommand::Uninstall => UninstallCommand::new(params.require_version()?).execute(&gvm),
            Subcommand::List => ListCommand::new(VersionQuery::Installed).execute(&gvm),
            Subcommand::Listall => ListCommand::new(VersionQuery::Available).execute(&gvm),
            Subcommand::AliasList => AliasListCommand::new().execute(&gvm),
            Subcommand::AliasCreate => {
                let version = params.require_version()?;
                let alias = params.require_alias()?;
                AliasCreateCommand::new(alias, version).execute(&gvm)
            }
            Subcommand::AliasDelete => AliasDeleteCommand::new(params.require_alias()?).execute(&gvm),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::utils::{Data, GvmError, MockExecutor};
    use mockall::Sequence;

    fn never_runs() -> MockExecutor {
        let mut mock = MockExecutor::new();
        mock.expect_run().never();
        mock
    }

    #[test]
    fn test_missing_version_spawns_nothing() {
        for subcommand in [
            Subcommand::Install,
            Subcommand::Uninstall,
            Subcommand::AliasCreate,
        ] {
            let params = Params {
                alias: Some("foo".to_string()),
                ..params(subcommand)
            };
            let outcome = CommandAdapter::new(never_runs()).execute(&params);
            assert_eq!(outcome, Outcome::failed("version option is required"));
        }
    }

    #[test]
    fn test_missing_alias_spawns_nothing() {
        for subcommand in [Subcommand::AliasCreate, Subcommand::AliasDelete] {
            let params = Params {
                version: Some("go1.4".to_string()),
                ..params(subcommand)
            };
            let outcome = CommandAdapter::new(never_runs()).execute(&params);
            assert_eq!(outcome, Outcome::failed("alias option is required"));
        }
    }

    #[test]
    fn test_version_checked_before_alias() {
        let err = CommandAdapter::new(never_runs())
            .try_execute(&params(Subcommand::AliasCreate))
            .unwrap_err();
        assert!(matches!(err, GvmError::MissingVersion));
    }

    #[test]
    fn test_missing_root_spawns_nothing() {
        let params = Params {
            version: Some("go1.4".to_string()),
            ..Params::default()
        };
        let outcome = CommandAdapter::new(never_runs())
            .with_env_root(None)
            .execute(&params);

        assert!(outcome.is_failed());
        assert_eq!(
            outcome,
            Outcome::failed(
                "Either the environment variable 'GVM_ROOT' or 'gvm_root' option is required"
            )
        );
    }

    #[test]
    fn test_environment_root_builds_program_path() {
        let mut mock = MockExecutor::new();
        mock.expect_run()
            .withf(|argv, env| {
                argv.len() == 2
                    && argv[0] == "/srv/gvm/bin/gvm"
                    && argv[1] == "list"
                    && env.get("GVM_ROOT").map(String::as_str) == Some("/srv/gvm")
            })
            .times(1)
            .return_once(|_, _| Ok(ok("gvm gos (installed)\n\n   go1.4\n")));

        let params = Params {
            subcommand: Subcommand::List,
            ..Params::default()
        };
        let outcome = CommandAdapter::new(mock)
            .with_env_root(Some("/srv/gvm".to_string()))
            .execute(&params);

        match outcome {
            Outcome::Unchanged(report) => {
                assert_eq!(report.data, Some(Data::Versions(vec!["go1.4".to_string()])))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let mut mock = MockExecutor::new();
        mock.expect_run().times(1).return_once(|argv, _| {
            Err(GvmError::Spawn {
                program: argv[0].clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            })
        });

        let outcome = CommandAdapter::new(mock).execute(&params(Subcommand::Listall));
        assert_eq!(
            outcome,
            Outcome::failed("Failed to execute /opt/gvm/bin/gvm: No such file")
        );
    }

    #[test]
    fn test_dispatch_alias_list() {
        let mut mock = MockExecutor::new();
        let mut seq = Sequence::new();
        expect_gvm(&mut mock, &mut seq, &["alias", "list"], ok("gvm go aliases\n"));

        let outcome = CommandAdapter::new(mock).execute(&params(Subcommand::AliasList));
        assert!(!outcome.is_failed());
        assert!(!outcome.is_changed());
    }
}
