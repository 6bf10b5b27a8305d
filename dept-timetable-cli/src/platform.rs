//! Desktop implementations of the export capabilities.

use std::{
    env,
    io::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dept_timetable_core::{
    Capability, Error, FileDescriptor, Result, ShareOutcome,
    capability::{FileSystem, NativeShare, PdfConverter, ShareSheet},
    permission::StoragePermission,
};
use tokio::{fs, process::Command};

/// Files under the documents directory
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    documents_dir: PathBuf,
}

impl LocalFileSystem {
    pub fn new(documents_dir: PathBuf) -> Result<Self> {
        if !documents_dir.exists() {
            std::fs::create_dir_all(&documents_dir).map_err(|e| {
                Error::Config(format!(
                    "Failed to create documents directory {}: {}",
                    documents_dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self { documents_dir })
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content.as_bytes())
            .await
            .map_err(|e| Error::write(path, e))
    }
}

/// Converts HTML through an external command such as `wkhtmltopdf`
#[derive(Debug, Clone)]
pub struct ExternalPdfConverter {
    program: PathBuf,
}

impl ExternalPdfConverter {
    /// Resolve the command on `PATH` (or take it as given if it is a path).
    pub fn locate(command: &str) -> Result<Self> {
        let candidate = PathBuf::from(command);
        if candidate.components().count() > 1 {
            return if candidate.is_file() {
                Ok(Self { program: candidate })
            } else {
                Err(Error::CapabilityAbsent(Capability::PdfConverter))
            };
        }

        env::var_os("PATH")
            .iter()
            .flat_map(env::split_paths)
            .flat_map(|dir| executable_names(command).map(move |name| dir.join(name)))
            .find(|path| path.is_file())
            .map(|program| Self { program })
            .ok_or(Error::CapabilityAbsent(Capability::PdfConverter))
    }
}

fn executable_names(command: &str) -> impl Iterator<Item = String> {
    let exe = if cfg!(windows) {
        Some(format!("{}.exe", command))
    } else {
        None
    };
    std::iter::once(command.to_string()).chain(exe)
}

#[async_trait]
impl PdfConverter for ExternalPdfConverter {
    async fn convert(&self, html: &str, file_name: &str, directory: &Path) -> Result<PathBuf> {
        let source = directory.join(format!(".{}.html", file_name));
        let target = directory.join(file_name);

        fs::write(&source, html)
            .await
            .map_err(|e| Error::write(&source, e))?;

        let output = Command::new(&self.program)
            .arg("--quiet")
            .arg(&source)
            .arg(&target)
            .output()
            .await;

        if let Err(e) = fs::remove_file(&source).await {
            tracing::debug!("Failed to remove {}: {}", source.display(), e);
        }

        let output = output.map_err(|e| Error::Conversion(e.to_string()))?;
        if !output.status.success() {
            return Err(Error::Conversion(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(target)
    }
}

/// Native share stand-in: drops shared files into an outbox directory
#[derive(Debug, Clone)]
pub struct OutboxShare {
    outbox: PathBuf,
}

impl OutboxShare {
    pub fn new(outbox: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&outbox)?;
        Ok(Self { outbox })
    }
}

#[async_trait]
impl NativeShare for OutboxShare {
    async fn share_file(&self, file: &FileDescriptor) -> Result<ShareOutcome> {
        let target = self.outbox.join(&file.file_name);
        fs::copy(&file.path, &target).await?;
        tracing::info!(
            "Shared {} ({}) to {}",
            file.file_name,
            file.mime_type,
            target.display()
        );
        println!("✓ Shared {} to {}", file.file_name, target.display());
        Ok(ShareOutcome::Shared)
    }
}

/// Share sheet that prints the message on standard output
#[derive(Debug, Clone, Default)]
pub struct StdoutShareSheet;

#[async_trait]
impl ShareSheet for StdoutShareSheet {
    async fn share_text(&self, message: &str, title: &str) -> Result<ShareOutcome> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "===== {} =====", title)?;
        writeln!(stdout, "{}", message.trim_end())?;
        stdout.flush()?;
        Ok(ShareOutcome::Shared)
    }
}

/// Storage permission: the documents directory must be creatable and writable
#[derive(Debug, Clone)]
pub struct DirectoryPermission {
    dir: PathBuf,
}

impl DirectoryPermission {
    pub fn new(dir: PathBuf) -> Arc<Self> {
        Arc::new(Self { dir })
    }
}

#[async_trait]
impl StoragePermission for DirectoryPermission {
    async fn request(&self) -> Result<bool> {
        if let Err(e) = fs::create_dir_all(&self.dir).await {
            tracing::debug!("Cannot create {}: {}", self.dir.display(), e);
            return Ok(false);
        }
        let metadata = fs::metadata(&self.dir).await?;
        Ok(!metadata.permissions().readonly())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("dept-timetable-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn local_file_system_overwrites() {
        let dir = scratch_dir("fs");
        let fs = LocalFileSystem::new(dir.clone()).unwrap();
        let path = dir.join("Level_100_First_Trimester_Timetable.txt");

        tokio_test::block_on(async {
            fs.write(&path, "first").await.unwrap();
            fs.write(&path, "second").await.unwrap();
        });
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn outbox_receives_shared_file() {
        let dir = scratch_dir("outbox");
        let source = dir.join("Level_100_First_Trimester_Timetable.csv");
        std::fs::write(&source, "Day,Start Time\n").unwrap();
        let share = OutboxShare::new(dir.join("outbox")).unwrap();

        let outcome = tokio_test::block_on(share.share_file(&FileDescriptor {
            path: source,
            file_name: "Level_100_First_Trimester_Timetable.csv".to_string(),
            mime_type: "text/csv".to_string(),
        }))
        .unwrap();

        assert_eq!(outcome, ShareOutcome::Shared);
        assert!(dir.join("outbox/Level_100_First_Trimester_Timetable.csv").is_file());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_pdf_command_is_absent() {
        let result = ExternalPdfConverter::locate("definitely-not-a-pdf-converter-binary");
        assert!(matches!(
            result,
            Err(Error::CapabilityAbsent(Capability::PdfConverter))
        ));
    }

    #[test]
    fn writable_directory_grants_permission() {
        let dir = scratch_dir("perm");
        let permission = DirectoryPermission::new(dir.join("docs"));
        assert!(tokio_test::block_on(permission.request()).unwrap());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
