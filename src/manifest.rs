use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::runtime::Runtime;

pub const MANIFEST_FILE: &str = "package.json";

/// The parts of `package.json` the installer reads
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PackageManifest {
    pub version: String,
    pub goforblob: BlobSpec,
}

/// The `goforblob` section of `package.json`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BlobSpec {
    /// Name of the executable inside the archive, without `.exe`
    pub name: String,
    /// Download URL template with `{version}`, `{platform}`, `{arch}` and `{name}` tokens
    pub url: String,
}

impl PackageManifest {
    /// Load `package.json` from the given project directory
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(MANIFEST_FILE);
        let content = runtime.read_to_string(&path)?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: PackageManifest = serde_json::from_str(content)?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_project;
    use mockall::predicate::eq;

    #[test]
    fn test_parse_manifest() {
        let manifest = PackageManifest::parse(
            r#"{
                "name": "tool-npm",
                "version": "1.2.0",
                "scripts": { "postinstall": "goforblob install" },
                "goforblob": {
                    "name": "tool",
                    "url": "https://example.com/{name}/{version}/{name}_{platform}_{arch}.tar.gz"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.goforblob.name, "tool");
        assert!(manifest.goforblob.url.contains("{platform}"));
    }

    #[test]
    fn test_parse_missing_section() {
        let err = PackageManifest::parse(r#"{"version": "1.0.0"}"#).unwrap_err();
        assert!(err.to_string().contains("goforblob"));
    }

    #[test]
    fn test_parse_missing_fields() {
        assert!(PackageManifest::parse(r#"{"goforblob": {"name": "a", "url": "b"}}"#).is_err());
        assert!(
            PackageManifest::parse(r#"{"version": "1", "goforblob": {"name": "a"}}"#).is_err()
        );
        assert!(PackageManifest::parse(r#"{"version": "1", "goforblob": {"url": "b"}}"#).is_err());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(PackageManifest::parse("version: 1.0.0").is_err());
    }

    #[test]
    fn test_load_reads_from_project_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(test_project().join("package.json")))
            .returning(|_| {
                Ok(r#"{"version": "0.3.1", "goforblob": {"name": "x", "url": "u"}}"#.into())
            });

        let manifest = PackageManifest::load(&runtime, &test_project()).unwrap();
        assert_eq!(manifest.version, "0.3.1");
    }

    #[test]
    fn test_load_invalid_manifest_names_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{}".into()));

        let err = PackageManifest::load(&runtime, &test_project()).unwrap_err();
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Err(anyhow::anyhow!("Failed to read package.json")));

        assert!(PackageManifest::load(&runtime, &test_project()).is_err());
    }
}
