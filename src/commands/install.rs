use anyhow::Result;
use log::debug;

use crate::download::Downloader;
use crate::metadata::InstallMetadata;
use crate::package_manager::Npm;
use crate::platform::HostIds;
use crate::runtime::Runtime;

use super::config::Context;

/// Mode applied to the installed executable on non-Windows platforms
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Install the binary described by the project's `package.json`
#[tracing::instrument(skip(runtime, downloader))]
pub async fn install<R: Runtime, D: Downloader>(
    runtime: &R,
    downloader: &D,
    host: &HostIds,
) -> Result<()> {
    let npm = Npm::new(runtime);
    let ctx = Context::detect(runtime, &npm)?;
    let meta = InstallMetadata::build(runtime, &npm, host, &ctx.project_dir, ctx.global)?;
    install_binary(runtime, downloader, &meta).await
}

/// Download, extract and copy the executable into place.
/// Nothing is rolled back if a step fails.
#[tracing::instrument(skip(runtime, downloader))]
pub async fn install_binary<R: Runtime, D: Downloader>(
    runtime: &R,
    downloader: &D,
    meta: &InstallMetadata,
) -> Result<()> {
    println!("Downloading {}", meta.url);
    downloader
        .download_and_extract(&meta.url, &meta.download_path)
        .await?;

    println!("Copying to {}", meta.bin_path.display());
    runtime.create_dir_all(&meta.bin_path)?;
    let target = meta.bin_file_path();
    runtime.copy(&meta.extracted_file_path(), &target)?;

    if !meta.platform.is_windows() {
        debug!("Setting mode {:o} on {:?}", EXECUTABLE_MODE, target);
        runtime.set_permissions(&target, EXECUTABLE_MODE)?;
    }

    println!("{} is installed", meta.bin_file_name);
    Ok(())
}
