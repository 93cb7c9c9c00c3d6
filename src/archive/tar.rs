use crate::runtime::Runtime;
use ::tar::Archive;
use anyhow::{Context, Result, anyhow};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use log::{debug, info};
use std::io::Read;
use std::path::Path;

use super::{ArchiveExtractor, ArchiveKind, entry_relative_path};

/// Extractor for .tar, .tar.gz and .tar.bz2 archives
pub struct TarExtractor;

impl ArchiveExtractor for TarExtractor {
    fn can_handle(&self, kind: ArchiveKind) -> bool {
        matches!(
            kind,
            ArchiveKind::Tar | ArchiveKind::TarGz | ArchiveKind::TarBz2
        )
    }

    fn extract<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        kind: ArchiveKind,
        extract_to: &Path,
    ) -> Result<()> {
        debug!("Extracting {:?} archive to {:?}...", kind, extract_to);
        let file = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;

        let reader: Box<dyn Read + Send> = match kind {
            ArchiveKind::TarGz => Box::new(GzDecoder::new(file)),
            ArchiveKind::TarBz2 => Box::new(BzDecoder::new(file)),
            _ => file,
        };
        let mut archive = Archive::new(reader);

        let mut extracted_files = 0usize;
        for entry in archive
            .entries()
            .with_context(|| format!("Failed to read tar archive {:?}", archive_path))?
        {
            let mut entry = entry.context("Failed to read tar entry")?;
            let entry_path = entry
                .path()
                .context("Invalid entry path in tar archive")?
                .into_owned();

            let Some(relative) = entry_relative_path(&entry_path)? else {
                continue;
            };
            let full_path = extract_to.join(&relative);
            let entry_type = entry.header().entry_type();

            if entry_type.is_dir() {
                runtime.create_dir_all(&full_path)?;
            } else if entry_type.is_file() {
                if let Some(parent) = full_path.parent() {
                    runtime.create_dir_all(parent)?;
                }
                let mut dest_file = runtime.create_file(&full_path)?;
                std::io::copy(&mut entry, &mut dest_file)
                    .with_context(|| format!("Failed to extract file {:?}", full_path))?;
                drop(dest_file);
                extracted_files += 1;

                #[cfg(unix)]
                if let Ok(mode) = entry.header().mode()
                    && let Err(e) = runtime.set_permissions(&full_path, mode & 0o777)
                {
                    debug!("Failed to set permissions on {:?}: {}", full_path, e);
                }
            } else {
                debug!("Skipping {:?} entry {:?}", entry_type, entry_path);
            }
        }

        if extracted_files == 0 {
            return Err(anyhow!("Archive appears to be empty."));
        }

        info!("Extracted {} file(s).", extracted_files);
        Ok(())
    }
}
