use crate::archive::ArchiveExtractorImpl;
use crate::http::HttpClient;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Fetches an archive and unpacks it into a directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download_and_extract(&self, url: &str, dest_dir: &Path) -> Result<()>;
}

/// [`Downloader`] that streams over HTTP and extracts through the runtime
pub struct HttpDownloader<R: Runtime> {
    runtime: R,
    http_client: HttpClient,
    extractor: ArchiveExtractorImpl,
}

impl<R: Runtime> HttpDownloader<R> {
    pub fn new(runtime: R, http_client: HttpClient) -> Self {
        Self {
            runtime,
            http_client,
            extractor: ArchiveExtractorImpl::new(),
        }
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

#[async_trait]
impl<R: Runtime> Downloader for HttpDownloader<R> {
    #[tracing::instrument(skip(self))]
    async fn download_and_extract(&self, url: &str, dest_dir: &Path) -> Result<()> {
        self.runtime.create_dir_all(dest_dir)?;

        let archive_path = archive_path_for(url, dest_dir);
        download_file(&self.runtime, url, &archive_path, &self.http_client).await?;

        self.extractor
            .extract(&self.runtime, &archive_path, url, dest_dir)?;

        debug!("Removing downloaded archive {:?}", archive_path);
        self.runtime.remove_file(&archive_path)?;
        Ok(())
    }
}

/// Hidden file in `dest_dir` the archive is downloaded to before extraction
fn archive_path_for(url: &str, dest_dir: &Path) -> PathBuf {
    let name = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("archive");
    dest_dir.join(format!(".download-{}", name))
}

/// Downloads a file from a URL to a local path.
#[tracing::instrument(skip(runtime, http_client))]
pub async fn download_file<R: Runtime>(
    runtime: &R,
    url: &str,
    dest_path: &Path,
    http_client: &HttpClient,
) -> Result<()> {
    info!("Downloading file from {}...", url);

    http_client
        .download_file(url, || {
            runtime
                .create_file(dest_path)
                .with_context(|| format!("Failed to create download file at {:?}", dest_path))
        })
        .await?;

    info!("Download complete.");
    Ok(())
}
