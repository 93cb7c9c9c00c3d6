use clap::Parser;
use clap::error::ErrorKind;
use goforblob::commands::{self, config::Config};
use log::debug;
use std::ffi::OsString;

/// goforblob - install a platform binary from an npm package
///
/// Reads the `goforblob` section of package.json in the current directory,
/// downloads the release archive for this platform and places the binary
/// into npm's bin directory. Meant to run from `postinstall` and
/// `preuninstall` scripts.
///
/// Examples:
///   goforblob install      # Download and install the binary
///   goforblob uninstall    # Remove the installed binary
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// `install` or `uninstall`; anything else prints usage
    #[arg(value_name = "COMMAND", allow_hyphen_values = true)]
    command: Option<OsString>,

    /// Ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<OsString>,
}

/// Pick the command token out of the process arguments.
///
/// Only `--help` and `--version` are allowed to stop the program. Any other
/// parse failure, or a token that is not UTF-8, falls through to the usage.
fn command_arg<I, T>(args: I) -> Result<Option<String>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli.command.and_then(|c| c.into_string().ok())),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Err(e)
        }
        Err(e) => {
            debug!("Treating unparsable arguments as usage request: {}", e);
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let command = command_arg(std::env::args_os()).unwrap_or_else(|e| e.exit());

    if let Err(e) = commands::dispatch(command.as_deref(), Config::new).await {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}
