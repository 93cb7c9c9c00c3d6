use anyhow::Result;
use std::io;

use crate::metadata::InstallMetadata;
use crate::package_manager::Npm;
use crate::platform::HostIds;
use crate::runtime::Runtime;

use super::config::Context;

/// Remove the binary described by the project's `package.json`
#[tracing::instrument(skip(runtime))]
pub fn uninstall<R: Runtime>(runtime: &R, host: &HostIds) -> Result<()> {
    let npm = Npm::new(runtime);
    let ctx = Context::detect(runtime, &npm)?;
    let meta = InstallMetadata::build(runtime, &npm, host, &ctx.project_dir, ctx.global)?;
    remove_binary(runtime, &meta)
}

/// Delete the installed executable. A binary that is already gone is not an error.
#[tracing::instrument(skip(runtime))]
pub fn remove_binary<R: Runtime>(runtime: &R, meta: &InstallMetadata) -> Result<()> {
    let bin_file_path = meta.bin_file_path();
    println!("Removing {}", bin_file_path.display());

    match runtime.remove_file(&bin_file_path) {
        Ok(()) => {}
        Err(e) if is_not_found(&e) => {
            println!("{} does not exist", bin_file_path.display());
        }
        Err(e) => return Err(e),
    }

    println!("{} is removed", meta.bin_file_name);
    Ok(())
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::test_utils::{test_bin_dir, test_project};
    use anyhow::{Context as _, anyhow};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    fn meta_in(bin_path: std::path::PathBuf) -> InstallMetadata {
        InstallMetadata {
            version: "1.2.0".into(),
            arch: Arch::Amd64,
            platform: Os::Linux,
            url: "https://example.com/tool.tar.gz".into(),
            bin_file_name: "tool".into(),
            bin_path,
            download_path: test_project().join(".tmp"),
        }
    }

    #[test]
    fn test_is_not_found() {
        let err = anyhow::Error::from(io::Error::from(io::ErrorKind::NotFound));
        assert!(is_not_found(&err));

        let err = Err::<(), _>(io::Error::from(io::ErrorKind::NotFound))
            .context("Failed to remove /x")
            .unwrap_err();
        assert!(is_not_found(&err));

        let err = anyhow::Error::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!is_not_found(&err));
        assert!(!is_not_found(&anyhow!("something else")));
    }

    #[test]
    fn test_remove_existing_binary() {
        let dir = tempdir().unwrap();
        let meta = meta_in(dir.path().to_path_buf());
        std::fs::write(meta.bin_file_path(), "binary").unwrap();
        assert!(meta.bin_file_path().exists());

        remove_binary(&RealRuntime, &meta).unwrap();

        assert!(!meta.bin_file_path().exists());
    }

    #[test]
    fn test_remove_missing_binary_is_ok() {
        let dir = tempdir().unwrap();
        let meta = meta_in(dir.path().to_path_buf());
        assert!(!meta.bin_file_path().exists());

        remove_binary(&RealRuntime, &meta).unwrap();
    }

    #[test]
    fn test_remove_other_errors_propagate() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_remove_file()
            .with(eq(test_bin_dir().join("tool")))
            .times(1)
            .returning(|_| {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
                    .context("Failed to remove tool")
            });

        let err = remove_binary(&runtime, &meta_in(test_bin_dir())).unwrap_err();
        assert!(err.to_string().contains("Failed to remove"));
    }

    #[test]
    fn test_uninstall_global() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(test_project()));
        runtime
            .expect_env_var()
            .with(eq("npm_config_global"))
            .returning(|_| Ok("true".into()));
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"{"version": "2.0.0", "goforblob": {"name": "tool", "url": "https://x/{name}.zip"}}"#
                .into())
        });
        runtime
            .expect_command_output()
            .withf(|_, args| args.join(" ") == "bin -g")
            .times(1)
            .returning(|_, _| Ok(test_bin_dir().to_string_lossy().into_owned()));
        runtime
            .expect_remove_file()
            .with(eq(test_bin_dir().join("tool.exe")))
            .times(1)
            .returning(|_| Ok(()));

        uninstall(&runtime, &HostIds::new("x64", "win32")).unwrap();
    }
}
