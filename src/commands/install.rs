use tracing::info;

use super::list::VersionQuery;
use super::Gvm;
use crate::utils::{Outcome, Params, Report, Result};

/// Optional switches of `gvm install`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallFlags {
    pub binary: bool,
    pub prefer_binary: bool,
    pub with_build_tools: bool,
    pub with_protobuf: bool,
}

impl InstallFlags {
    pub fn to_args(self) -> Vec<&'static str> {
        [
            (self.binary, "--binary"),
            (self.prefer_binary, "--prefer-binary"),
            (self.with_build_tools, "--with-build-tools"),
            (self.with_protobuf, "--with-protobuf"),
        ]
        .into_iter()
        .filter_map(|(enabled, flag)| enabled.then_some(flag))
        .collect()
    }
}

impl From<&Params> for InstallFlags {
    fn from(params: &Params) -> Self {
        InstallFlags {
            binary: params.binary,
            prefer_binary: params.prefer_binary,
            with_build_tools: params.with_build_tools,
            with_protobuf: params.with_protobuf,
        }
    }
}

pub struct InstallCommand<'p> {
    version: &'p str,
    flags: InstallFlags,
}

impl<'p> InstallCommand<'p> {
    pub fn new(version: &'p str, flags: InstallFlags) -> Self {
        InstallCommand { version, flags }
    }

    pub fn execute(&self, gvm: &Gvm) -> Result<Outcome> {
        let installed = match VersionQuery::Installed.fetch(gvm)? {
            Ok(listing) => listing.items,
            Err(result) => return Ok(Outcome::failed_run(result)),
        };

        if installed.iter().any(|v| v == self.version) {
            info!(version = %self.version, "already installed");
            return Ok(Outcome::Unchanged(Report::new("Already installed!", "")));
        }

        let mut args = vec!["install", self.version];
        args.extend(self.flags.to_args());

        Ok(Outcome::from_mutation(gvm.run(&args)?))
    }
}

pub struct UninstallCommand<'p> {
    version: &'p str,
}

impl<'p> UninstallCommand<'p> {
    pub fn new(version: &'p str) -> Self {
        UninstallCommand { version }
    }

    pub fn execute(&self, gvm: &Gvm) -> Result<Outcome> {
        let installed = match VersionQuery::Installed.fetch(gvm)? {
            Ok(listing) => listing.items,
            Err(result) => return Ok(Outcome::failed_run(result)),
        };

        if !installed.iter().any(|v| v == self.version) {
            info!(version = %self.version, "not installed, nothing to remove");
            return Ok(Outcome::Unchanged(Report::default()));
        }

        Ok(Outcome::from_mutation(gvm.run(&["uninstall", self.version])?))
    }
}
