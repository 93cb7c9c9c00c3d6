//! Package manager queries and bin directory resolution.
//!
//! The installer only needs a few answers from the package manager: where
//! global executables go, where the project's dependencies live, and where
//! global packages live. [`PackageManager`] narrows subprocess access to
//! exactly those questions so callers can be tested with fixed answers.

mod npm;

use anyhow::{Result, anyhow};
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub use npm::Npm;

/// Directory that holds installed dependencies
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Directory under [`DEPENDENCY_DIR`] holding project-local executables
pub const LOCAL_BIN_DIR: &str = ".bin";

/// Environment variable npm sets while running lifecycle scripts of a global install
pub const GLOBAL_INSTALL_ENV: &str = "npm_config_global";

#[cfg_attr(test, mockall::automock)]
pub trait PackageManager {
    /// Directory where globally installed executables live
    fn global_bin_dir(&self) -> Result<PathBuf>;

    /// Dependency root of the current project (e.g. `/proj/node_modules`)
    fn dependency_root(&self) -> Result<String>;

    /// Dependency root of globally installed packages
    fn global_root(&self) -> Result<String>;
}

/// Directory where the current package's executable should live.
#[tracing::instrument(skip(pm))]
pub fn bin_dir<P: PackageManager>(pm: &P, global: bool) -> Result<PathBuf> {
    if global {
        return pm.global_bin_dir();
    }
    let root = pm.dependency_root()?;
    local_bin_dir(&root)
}

/// Truncate a dependency root at its first `node_modules` component and
/// return `<prefix>/node_modules/.bin`.
pub fn local_bin_dir(dependency_root: &str) -> Result<PathBuf> {
    let index = dependency_root
        .find(DEPENDENCY_DIR)
        .ok_or_else(|| anyhow!("Unable to determine npm root from {:?}", dependency_root))?;

    let prefix = &dependency_root[..index];
    let bin_dir = Path::new(prefix).join(DEPENDENCY_DIR).join(LOCAL_BIN_DIR);
    debug!("Local bin dir for {:?}: {:?}", dependency_root, bin_dir);
    Ok(bin_dir)
}

/// Whether the package being installed from `package_dir` is a global install.
///
/// npm exports `npm_config_global=true` to lifecycle scripts of `npm i -g`.
/// Without it, the package counts as global when it sits under the global
/// dependency root. A failing query means local.
#[tracing::instrument(skip(runtime, pm))]
pub fn is_installed_globally<R: Runtime, P: PackageManager>(
    runtime: &R,
    pm: &P,
    package_dir: &Path,
) -> bool {
    if let Ok(value) = runtime.env_var(GLOBAL_INSTALL_ENV) {
        debug!("{}={}", GLOBAL_INSTALL_ENV, value);
        return value.eq_ignore_ascii_case("true");
    }

    match pm.global_root() {
        Ok(root) if !root.is_empty() => package_dir.starts_with(&root),
        Ok(_) => false,
        Err(e) => {
            debug!("Unable to query global root, assuming local install: {}", e);
            false
        }
    }
}
