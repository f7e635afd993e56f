use tracing::debug;

use super::{Gvm, Listing, Query};
use crate::utils::{Data, Outcome, Report, Result, VersionSet};

const INSTALLED_HEADER: &str = "gvm gos (installed)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionQuery {
    /// `gvm list`
    Installed,
    /// `gvm listall`
    Available,
}

impl VersionQuery {
    fn args(self) -> &'static [&'static str] {
        match self {
            VersionQuery::Installed => &["list"],
            VersionQuery::Available => &["listall"],
        }
    }

    fn parse(self, stdout: &str) -> VersionSet {
        match self {
            VersionQuery::Installed => parse_list(stdout),
            VersionQuery::Available => parse_listall(stdout),
        }
    }

    /// Run the query. A non-zero exit hands back the raw result instead.
    pub fn fetch(self, gvm: &Gvm) -> Result<Query<VersionSet>> {
        let result = gvm.run(self.args())?;
        if !result.success() {
            return Ok(Err(result));
        }

        let items = self.parse(&result.stdout);
        debug!(count = items.len(), "parsed versions");
        Ok(Ok(Listing {
            items,
            stdout: result.stdout,
            stderr: result.stderr,
        }))
    }
}

/// Parse `gvm list`: trimmed non-empty lines without the header.
pub fn parse_list(stdout: &str) -> VersionSet {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != INSTALLED_HEADER)
        .map(str::to_string)
        .collect()
}

/// Parse `gvm listall`: trimmed non-empty lines, nothing else dropped.
pub fn parse_listall(stdout: &str) -> VersionSet {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct ListCommand {
    query: VersionQuery,
}

impl ListCommand {
    pub fn new(query: VersionQuery) -> Self {
        ListCommand { query }
    }

    pub fn execute(&self, gvm: &Gvm) -> Result<Outcome> {
        Ok(match self.query.fetch(gvm)? {
            Ok(listing) => Outcome::Unchanged(
                Report::new(listing.stdout, listing.stderr)
                    .with_data(Data::Versions(listing.items)),
            ),
            Err(result) => Outcome::failed_run(result),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::utils::MockExecutor;
    use mockall::Sequence;

    #[test]
    fn test_parse_list_drops_header_and_blanks() {
        assert_eq!(
            parse_list("gvm gos (installed)\n go1.4 \n go1.5\n"),
            vec!["go1.4", "go1.5"]
        );
    }

    #[test]
    fn test_parse_list_real_layout() {
        let stdout = "\ngvm gos (installed)\n\n   go1.4\n=> go1.5\n   system\n\n";
        assert_eq!(parse_list(stdout), vec!["go1.4", "=> go1.5", "system"]);
    }

    #[test]
    fn test_parse_listall_keeps_header_lines() {
        assert_eq!(parse_listall(" go1.4\n\n go1.5\n"), vec!["go1.4", "go1.5"]);
        assert_eq!(
            parse_listall("\ngvm gos (available)\n\n   go1\n   go1.0.1\n"),
            vec!["gvm gos (available)", "go1", "go1.0.1"]
        );
    }

    #[test]
    fn test_list_reports_unchanged_with_versions() {
        let mut mock = MockExecutor::new();
        let mut seq = Sequence::new();
        let stdout = "gvm gos (installed)\n go1.4 \n go1.5\n";
        expect_gvm(&mut mock, &mut seq, &["list"], ok(stdout));

        let gvm = Gvm::new(&mock, ROOT);
        let outcome = ListCommand::new(VersionQuery::Installed).execute(&gvm).unwrap();

        assert_eq!(
            outcome,
            Outcome::Unchanged(
                Report::new(stdout, "").with_data(Data::Versions(vec![
                    "go1.4".to_string(),
                    "go1.5".to_string()
                ]))
            )
        );
    }

    #[test]
    fn test_listall_failure() {
        let mut mock = MockExecutor::new();
        let mut seq = Sequence::new();
        expect_gvm(
            &mut mock,
            &mut seq,
            &["listall"],
            exited(1, "", "ERROR: Could not fetch versions"),
        );

        let gvm = Gvm::new(&mock, ROOT);
        let outcome = ListCommand::new(VersionQuery::Available).execute(&gvm).unwrap();

        assert!(outcome.is_failed());
        assert_eq!(
            outcome,
            Outcome::Failed {
                msg: "ERROR: Could not fetch versions".to_string(),
                stdout: String::new(),
                stderr: "ERROR: Could not fetch versions".to_string(),
            }
        );
    }
}
