use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use super::{Gvm, Listing, Query};
use crate::utils::{AliasTable, Data, Outcome, Report, Result};

const ALIASES_HEADER: &str = "gvm go aliases";

fn alias_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\S+) +\((\S+)\)").unwrap())
}

/// Parse one `gvm alias list` entry, `./name (version)`. The two-character
/// marker in front of the name is dropped.
fn parse_alias_line(line: &str) -> Option<(String, String)> {
    let caps = alias_line().captures(line)?;
    let name: String = caps[1].chars().skip(2).collect();
    Some((name, caps[2].to_string()))
}

/// Parse `gvm alias list` output. Lines that are neither blank, the header,
/// nor an alias entry are returned separately.
pub fn parse_alias_list(stdout: &str) -> (AliasTable, Vec<String>) {
    let mut aliases = AliasTable::new();
    let mut unparsed = Vec::new();

    for line in stdout.lines().map(str::trim) {
        if line.is_empty() || line == ALIASES_HEADER {
            continue;
        }
        match parse_alias_line(line) {
            Some((name, version)) => {
                aliases.insert(name, version);
            }
            None => unparsed.push(line.to_string()),
        }
    }

    (aliases, unparsed)
}

fn fetch_aliases(gvm: &Gvm) -> Result<Query<AliasTable>> {
    let result = gvm.run(&["alias", "list"])?;
    if !result.success() {
        return Ok(Err(result));
    }

    let (items, unparsed) = parse_alias_list(&result.stdout);
    let stderr = if unparsed.is_empty() {
        result.stderr
    } else {
        warn!(lines = ?unparsed, "unrecognized alias list output");
        format!("{}\n{}", result.stderr, unparsed.join("\n"))
            .trim()
            .to_string()
    };

    Ok(Ok(Listing {
        items,
        stdout: result.stdout,
        stderr,
    }))
}

pub struct AliasListCommand;

impl AliasListCommand {
    pub fn new() -> Self {
        AliasListCommand
    }

    pub fn execute(&self, gvm: &Gvm) -> Result<Outcome> {
        Ok(match fetch_aliases(gvm)? {
            Ok(listing) => Outcome::Unchanged(
                Report::new(listing.stdout, listing.stderr).with_data(Data::Aliases(listing.items)),
            ),
            Err(result) => Outcome::failed_run(result),
        })
    }
}

impl Default for AliasListCommand {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AliasCreateCommand<'p> {
    alias: &'p str,
    version: &'p str,
}

impl<'p> AliasCreateCommand<'p> {
    pub fn new(alias: &'p str, version: &'p str) -> Self {
        AliasCreateCommand { alias, version }
    }

    pub fn execute(&self, gvm: &Gvm) -> Result<Outcome> {
        let aliases = match fetch_aliases(gvm)? {
            Ok(listing) => listing.items,
            Err(result) => return Ok(Outcome::failed_run(result)),
        };

        match aliases.get(self.alias) {
            Some(existing) if existing == self.version => {
                info!(alias = %self.alias, version = %self.version, "alias already exists");
                Ok(Outcome::Unchanged(Report::new("Alias already exists!", "")))
            }
            Some(existing) => {
                warn!(alias = %self.alias, existing = %existing, requested = %self.version, "alias points elsewhere");
                Ok(Outcome::failed(format!(
                    "{} already exists but version differs",
                    self.alias
                )))
            }
            None => Ok(Outcome::from_mutation(
                gvm.run(&["alias", "create", self.alias, self.version])?,
            )),
        }
    }
}

pub struct AliasDeleteCommand<'p> {
    alias: &'p str,
}

impl<'p> AliasDeleteCommand<'p> {
    pub fn new(alias: &'p str) -> Self {
        AliasDeleteCommand { alias }
    }

    pub fn execute(&self, gvm: &Gvm) -> Result<Outcome> {
        let aliases = match fetch_aliases(gvm)? {
            Ok(listing) => listing.items,
            Err(result) => return Ok(Outcome::failed_run(result)),
        };

        if !aliases.contains_key(self.alias) {
            info!(alias = %self.alias, "alias absent, nothing to delete");
            return Ok(Outcome::Unchanged(Report::default()));
        }

        Ok(Outcome::from_mutation(
            gvm.run(&["alias", "delete", self.alias])?,
        ))
    }
}
