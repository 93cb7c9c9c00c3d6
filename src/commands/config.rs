use anyhow::Result;
use log::debug;
use reqwest::Client;
use std::path::PathBuf;

use crate::{
    download::{Downloader, HttpDownloader},
    http::HttpClient,
    package_manager::{self, PackageManager},
    platform::HostIds,
    runtime::{RealRuntime, Runtime},
};

pub const USER_AGENT: &str = concat!("goforblob/", env!("CARGO_PKG_VERSION"));

/// Collaborators a command runs against
pub struct Config<R: Runtime, D: Downloader> {
    pub runtime: R,
    pub downloader: D,
    pub host: HostIds,
}

impl Config<RealRuntime, HttpDownloader<RealRuntime>> {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let downloader = HttpDownloader::new(RealRuntime, HttpClient::new(client));

        Ok(Self {
            runtime: RealRuntime,
            downloader,
            host: HostIds::detect(),
        })
    }
}

/// Where the command was invoked from, captured once per run
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// Directory holding the package's `package.json`
    pub project_dir: PathBuf,
    /// Whether the package is being installed globally
    pub global: bool,
}

impl Context {
    #[tracing::instrument(skip(runtime, pm))]
    pub fn detect<R: Runtime, P: PackageManager>(runtime: &R, pm: &P) -> Result<Self> {
        let project_dir = runtime.current_dir()?;
        let global = package_manager::is_installed_globally(runtime, pm, &project_dir);
        debug!("Project dir {:?}, global install: {}", project_dir, global);
        Ok(Self {
            project_dir,
            global,
        })
    }
}
