use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use super::PackageManager;
use crate::runtime::Runtime;

#[cfg(windows)]
const NPM: &str = "npm.cmd";
#[cfg(not(windows))]
const NPM: &str = "npm";

/// [`PackageManager`] backed by the `npm` command line
pub struct Npm<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> Npm<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runtime.command_output(NPM, &args)
    }
}

impl<R: Runtime> PackageManager for Npm<'_, R> {
    #[tracing::instrument(skip(self))]
    fn global_bin_dir(&self) -> Result<PathBuf> {
        match self.query(&["bin", "-g"]) {
            Ok(dir) => Ok(PathBuf::from(dir)),
            Err(e) => {
                // npm 9 dropped `npm bin`; derive it from the global prefix instead
                debug!("`npm bin -g` failed ({}), falling back to prefix", e);
                let prefix = self
                    .query(&["prefix", "-g"])
                    .context("Unable to determine npm global bin directory")?;
                Ok(global_bin_from_prefix(&prefix))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    fn dependency_root(&self) -> Result<String> {
        self.query(&["root"])
    }

    #[tracing::instrument(skip(self))]
    fn global_root(&self) -> Result<String> {
        self.query(&["root", "-g"])
    }
}

fn global_bin_from_prefix(prefix: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(prefix)
    } else {
        PathBuf::from(prefix).join("bin")
    }
}
