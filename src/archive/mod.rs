mod tar;
mod zip;

use crate::runtime::Runtime;
use anyhow::{Context, Result, anyhow};
use log::debug;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

pub use self::tar::TarExtractor;
pub use self::zip::ZipExtractor;

/// Archive formats the installer can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    TarBz2,
    Tar,
    Zip,
}

/// Bytes needed to recognise every supported format
const SNIFF_LEN: usize = 512;

impl ArchiveKind {
    /// Recognise an archive from its leading bytes
    pub fn sniff(head: &[u8]) -> Option<Self> {
        if head.starts_with(&[0x1f, 0x8b]) {
            return Some(ArchiveKind::TarGz);
        }
        if head.starts_with(b"BZh") {
            return Some(ArchiveKind::TarBz2);
        }
        if head.starts_with(b"PK\x03\x04") || head.starts_with(b"PK\x05\x06") {
            return Some(ArchiveKind::Zip);
        }
        // POSIX and GNU tar both carry "ustar" at offset 257
        if head.len() >= 262 && &head[257..262] == b"ustar" {
            return Some(ArchiveKind::Tar);
        }
        None
    }

    /// Guess the format from a file name or URL
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(ArchiveKind::TarBz2)
        } else if name.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else {
            None
        }
    }

    /// Content wins over the name; the name is only consulted when the
    /// content is not recognised.
    pub fn detect(head: &[u8], name: &str) -> Option<Self> {
        Self::sniff(head).or_else(|| Self::from_name(name))
    }
}

/// Trait for format-specific archive extractors
pub trait ArchiveExtractor: Send + Sync {
    /// Check if this extractor can handle the given archive format
    fn can_handle(&self, kind: ArchiveKind) -> bool;

    /// Extract the archive into the specified directory, keeping entry paths
    fn extract<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        kind: ArchiveKind,
        extract_to: &Path,
    ) -> Result<()>;
}

/// Dispatcher that detects the archive format and hands it to the matching extractor.
pub struct ArchiveExtractorImpl {
    tar: TarExtractor,
    zip: ZipExtractor,
}

impl Default for ArchiveExtractorImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveExtractorImpl {
    pub fn new() -> Self {
        Self {
            tar: TarExtractor,
            zip: ZipExtractor,
        }
    }

    /// Detect the format of `archive_path` and extract it into `extract_to`.
    /// `name_hint` is the download URL or file name, used when the content
    /// does not identify itself.
    #[tracing::instrument(skip(self, runtime))]
    pub fn extract<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        name_hint: &str,
        extract_to: &Path,
    ) -> Result<()> {
        let head = read_head(runtime, archive_path)?;
        let kind = ArchiveKind::detect(&head, name_hint)
            .ok_or_else(|| anyhow!("Unsupported archive format: {}", name_hint))?;
        debug!("Detected {:?} archive at {:?}", kind, archive_path);

        if self.tar.can_handle(kind) {
            return self.tar.extract(runtime, archive_path, kind, extract_to);
        }
        if self.zip.can_handle(kind) {
            return self.zip.extract(runtime, archive_path, kind, extract_to);
        }
        Err(anyhow!("Unsupported archive format: {}", name_hint))
    }
}

fn read_head<R: Runtime>(runtime: &R, archive_path: &Path) -> Result<Vec<u8>> {
    let reader = runtime
        .open(archive_path)
        .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    reader
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .with_context(|| format!("Failed to read archive {:?}", archive_path))?;
    Ok(head)
}

/// Turn an archive entry path into a path relative to the extraction
/// directory. Absolute paths and `..` components are rejected; `.` is
/// dropped. Returns `Ok(None)` for entries naming the root itself.
pub(crate) fn entry_relative_path(entry_path: &Path) -> Result<Option<PathBuf>> {
    let mut relative = PathBuf::new();
    for component in entry_path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(anyhow!(
                    "Refusing to extract entry outside the target directory: {}",
                    entry_path.display()
                ));
            }
        }
    }
    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}
