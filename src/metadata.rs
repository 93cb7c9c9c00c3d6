use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::manifest::PackageManifest;
use crate::package_manager::{self, PackageManager};
use crate::platform::{Arch, HostIds, Os};
use crate::runtime::Runtime;

/// Download and extraction directory, relative to the project directory
pub const DOWNLOAD_DIR: &str = ".tmp";

/// Everything needed to install or remove the binary for this host
#[derive(Debug, Clone, PartialEq)]
pub struct InstallMetadata {
    pub version: String,
    pub arch: Arch,
    pub platform: Os,
    pub url: String,
    pub bin_file_name: String,
    pub bin_path: PathBuf,
    pub download_path: PathBuf,
}

impl InstallMetadata {
    /// Build the metadata for a project directory.
    ///
    /// The manifest is read before the package manager is consulted, so a
    /// broken `package.json` fails without spawning anything.
    #[tracing::instrument(skip(runtime, pm))]
    pub fn build<R: Runtime, P: PackageManager>(
        runtime: &R,
        pm: &P,
        host: &HostIds,
        project_dir: &Path,
        global: bool,
    ) -> Result<Self> {
        let manifest = PackageManifest::load(runtime, project_dir)?;
        let host = host.descriptor()?;

        let bin_name = &manifest.goforblob.name;
        let url = render_url(
            &manifest.goforblob.url,
            &manifest.version,
            host.platform,
            host.arch,
            bin_name,
        );
        debug!("Resolved download URL: {}", url);

        Ok(Self {
            bin_file_name: format!("{}{}", bin_name, host.platform.exe_suffix()),
            bin_path: package_manager::bin_dir(pm, global)?,
            download_path: project_dir.join(DOWNLOAD_DIR),
            version: manifest.version,
            arch: host.arch,
            platform: host.platform,
            url,
        })
    }

    /// Full path of the installed executable
    pub fn bin_file_path(&self) -> PathBuf {
        self.bin_path.join(&self.bin_file_name)
    }

    /// Full path of the executable after extraction
    pub fn extracted_file_path(&self) -> PathBuf {
        self.download_path.join(&self.bin_file_name)
    }
}

/// Replace every `{version}`, `{platform}`, `{arch}` and `{name}` token in a URL template.
pub fn render_url(template: &str, version: &str, platform: Os, arch: Arch, name: &str) -> String {
    template
        .replace("{version}", version)
        .replace("{platform}", platform.as_str())
        .replace("{arch}", arch.as_str())
        .replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_manager::MockPackageManager;
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_project;

    const TEMPLATE: &str = "https://example.com/{name}/{version}/{name}_{platform}_{arch}.tar.gz";

    fn manifest_json(template: &str) -> String {
        format!(
            r#"{{"version": "1.2.0", "goforblob": {{"name": "tool", "url": "{}"}}}}"#,
            template
        )
    }

    fn runtime_with_manifest(template: &'static str) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(move |_| Ok(manifest_json(template)));
        runtime
    }

    fn local_pm() -> MockPackageManager {
        let mut pm = MockPackageManager::new();
        pm.expect_dependency_root()
            .returning(|| Ok("/home/user/proj/node_modules".into()));
        pm
    }

    #[test]
    fn test_render_url_replaces_all_tokens() {
        let url = render_url(TEMPLATE, "1.2.0", Os::Linux, Arch::Amd64, "tool");
        assert_eq!(url, "https://example.com/tool/1.2.0/tool_linux_amd64.tar.gz");
        assert!(!url.contains('{'));
    }

    #[test]
    fn test_render_url_is_case_sensitive() {
        let url = render_url("{Version}/{ARCH}/{arch}", "1.0", Os::Linux, Arch::Arm64, "t");
        assert_eq!(url, "{Version}/{ARCH}/arm64");
    }

    #[test]
    fn test_render_url_without_tokens_is_unchanged() {
        let url = render_url("https://example.com/fixed.zip", "1", Os::Darwin, Arch::Arm, "t");
        assert_eq!(url, "https://example.com/fixed.zip");
    }

    #[test]
    fn test_build_linux_x64() {
        let runtime = runtime_with_manifest(TEMPLATE);
        let pm = local_pm();

        let meta = InstallMetadata::build(
            &runtime,
            &pm,
            &HostIds::new("x64", "linux"),
            &test_project(),
            false,
        )
        .unwrap();

        assert_eq!(meta.url, "https://example.com/tool/1.2.0/tool_linux_amd64.tar.gz");
        assert_eq!(meta.version, "1.2.0");
        assert_eq!(meta.arch, Arch::Amd64);
        assert_eq!(meta.platform, Os::Linux);
        assert_eq!(meta.bin_file_name, "tool");
        assert_eq!(meta.bin_path, PathBuf::from("/home/user/proj/node_modules/.bin"));
        assert_eq!(meta.download_path, test_project().join(".tmp"));
        assert_eq!(
            meta.bin_file_path(),
            PathBuf::from("/home/user/proj/node_modules/.bin/tool")
        );
    }

    #[test]
    fn test_build_windows_appends_exe() {
        let runtime = runtime_with_manifest(TEMPLATE);
        let pm = local_pm();

        let meta = InstallMetadata::build(
            &runtime,
            &pm,
            &HostIds::new("ia32", "win32"),
            &test_project(),
            false,
        )
        .unwrap();

        assert_eq!(meta.bin_file_name, "tool.exe");
        assert_eq!(meta.url, "https://example.com/tool/1.2.0/tool_windows_386.tar.gz");
        assert_eq!(meta.extracted_file_path(), test_project().join(".tmp/tool.exe"));
    }

    #[test]
    fn test_build_global_uses_global_bin_dir() {
        let runtime = runtime_with_manifest(TEMPLATE);
        let mut pm = MockPackageManager::new();
        pm.expect_global_bin_dir()
            .returning(|| Ok(PathBuf::from("/usr/local/bin")));

        let meta = InstallMetadata::build(
            &runtime,
            &pm,
            &HostIds::new("arm64", "darwin"),
            &test_project(),
            true,
        )
        .unwrap();

        assert_eq!(meta.bin_path, PathBuf::from("/usr/local/bin"));
        assert_eq!(meta.url, "https://example.com/tool/1.2.0/tool_darwin_arm64.tar.gz");
    }

    #[test]
    fn test_build_unsupported_host_fails() {
        let runtime = runtime_with_manifest(TEMPLATE);
        // The package manager must not be consulted for an unsupported host
        let pm = MockPackageManager::new();

        let err = InstallMetadata::build(
            &runtime,
            &pm,
            &HostIds::new("riscv64", "linux"),
            &test_project(),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unsupported architecture"));
    }

    #[test]
    fn test_build_bad_manifest_skips_package_manager() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"version": "1.0.0"}"#.into()));
        let pm = MockPackageManager::new();

        let result = InstallMetadata::build(
            &runtime,
            &pm,
            &HostIds::new("x64", "linux"),
            &test_project(),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_nonstandard_layout_fails() {
        let runtime = runtime_with_manifest(TEMPLATE);
        let mut pm = MockPackageManager::new();
        pm.expect_dependency_root()
            .returning(|| Ok("/home/user/proj/deps".into()));

        let result = InstallMetadata::build(
            &runtime,
            &pm,
            &HostIds::new("x64", "linux"),
            &test_project(),
            false,
        );
        assert!(result.is_err());
    }
}
