use anyhow::Result;
use log::debug;

use crate::{download::Downloader, runtime::Runtime};

pub mod config;
mod install;
mod uninstall;

pub use install::{EXECUTABLE_MODE, install, install_binary};
pub use uninstall::{remove_binary, uninstall};

use config::Config;

pub const USAGE: &str = "\
Usage: goforblob [install|uninstall]
       goforblob            show this message";

/// The action selected by the first command line argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Install,
    Uninstall,
    Usage,
}

impl Command {
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            Some("install") => Command::Install,
            Some("uninstall") => Command::Uninstall,
            _ => Command::Usage,
        }
    }
}

/// Run the command named by `arg`.
///
/// `make_config` is only called for `install` and `uninstall`, so printing
/// the usage touches neither the filesystem nor the network.
#[tracing::instrument(skip(make_config))]
pub async fn dispatch<R, D, F>(arg: Option<&str>, make_config: F) -> Result<()>
where
    R: Runtime,
    D: Downloader,
    F: FnOnce() -> Result<Config<R, D>>,
{
    let command = Command::parse(arg);
    debug!("Dispatching {:?}", command);

    match command {
        Command::Install => {
            let config = make_config()?;
            install(&config.runtime, &config.downloader, &config.host).await
        }
        Command::Uninstall => {
            let config = make_config()?;
            uninstall(&config.runtime, &config.host)
        }
        Command::Usage => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}
