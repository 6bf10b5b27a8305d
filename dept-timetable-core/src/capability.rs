//! Optional platform capabilities and the startup probe that acquires them.
//!
//! File system access, PDF conversion and native file sharing may each be
//! missing at runtime. They are acquired once through loader closures; a
//! failed loader leaves its slot empty and the engine routes around it.
//! The plain-text share sheet is always available.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::Serialize;

use crate::{FileDescriptor, Result, ShareOutcome};

/// App-private file storage
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Root directory exported files are written into
    fn documents_dir(&self) -> &Path;

    /// Write UTF-8 content, replacing any existing file.
    async fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// HTML to PDF converter
#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Returns the path of the produced PDF.
    async fn convert(&self, html: &str, file_name: &str, directory: &Path) -> Result<PathBuf>;
}

/// Native share dialog that accepts files
#[async_trait]
pub trait NativeShare: Send + Sync {
    async fn share_file(&self, file: &FileDescriptor) -> Result<ShareOutcome>;
}

/// Universally available share sheet that takes a text message
#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn share_text(&self, message: &str, title: &str) -> Result<ShareOutcome>;
}

/// Names of the optional capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Capability {
    FileSystem,
    PdfConverter,
    NativeShare,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::FileSystem => "file system",
            Capability::PdfConverter => "PDF converter",
            Capability::NativeShare => "native share",
        };
        f.write_str(name)
    }
}

/// Which optional capabilities were acquired at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    pub has_file_system: bool,
    pub has_pdf_converter: bool,
    pub has_share_module: bool,
}

impl CapabilitySet {
    pub fn all_available(&self) -> bool {
        self.has_file_system && self.has_pdf_converter && self.has_share_module
    }

    /// Label of the export action presented to the user.
    pub fn strategy_label(&self) -> &'static str {
        if self.all_available() { "Save" } else { "Share" }
    }
}

/// Capabilities handed to the export engine
#[derive(Clone)]
pub struct Capabilities {
    pub(crate) file_system: Option<Arc<dyn FileSystem>>,
    pub(crate) pdf_converter: Option<Arc<dyn PdfConverter>>,
    pub(crate) native_share: Option<Arc<dyn NativeShare>>,
    pub(crate) share_sheet: Arc<dyn ShareSheet>,
    set: CapabilitySet,
}

impl Capabilities {
    pub fn builder(share_sheet: Arc<dyn ShareSheet>) -> CapabilitiesBuilder {
        CapabilitiesBuilder::new(share_sheet)
    }

    pub fn set(&self) -> CapabilitySet {
        self.set
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").field("set", &self.set).finish()
    }
}

/// Probes each optional capability independently.
pub struct CapabilitiesBuilder {
    file_system: Option<Arc<dyn FileSystem>>,
    pdf_converter: Option<Arc<dyn PdfConverter>>,
    native_share: Option<Arc<dyn NativeShare>>,
    share_sheet: Arc<dyn ShareSheet>,
}

impl CapabilitiesBuilder {
    pub fn new(share_sheet: Arc<dyn ShareSheet>) -> Self {
        Self {
            file_system: None,
            pdf_converter: None,
            native_share: None,
            share_sheet,
        }
    }

    pub fn file_system<F>(mut self, load: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn FileSystem>>,
    {
        self.file_system = acquire(Capability::FileSystem, load);
        self
    }

    pub fn pdf_converter<F>(mut self, load: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn PdfConverter>>,
    {
        self.pdf_converter = acquire(Capability::PdfConverter, load);
        self
    }

    pub fn native_share<F>(mut self, load: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn NativeShare>>,
    {
        self.native_share = acquire(Capability::NativeShare, load);
        self
    }

    pub fn build(self) -> Capabilities {
        let set = CapabilitySet {
            has_file_system: self.file_system.is_some(),
            has_pdf_converter: self.pdf_converter.is_some(),
            has_share_module: self.native_share.is_some(),
        };
        tracing::debug!(
            "Capability probe finished: file_system={}, pdf_converter={}, native_share={}",
            set.has_file_system,
            set.has_pdf_converter,
            set.has_share_module
        );

        Capabilities {
            file_system: self.file_system,
            pdf_converter: self.pdf_converter,
            native_share: self.native_share,
            share_sheet: self.share_sheet,
            set,
        }
    }
}

fn acquire<T: ?Sized>(capability: Capability, load: impl FnOnce() -> Result<Arc<T>>) -> Option<Arc<T>> {
    match load() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::debug!("{} unavailable: {}", capability, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Sheet;

    #[async_trait]
    impl ShareSheet for Sheet {
        async fn share_text(&self, _message: &str, _title: &str) -> Result<ShareOutcome> {
            Ok(ShareOutcome::Shared)
        }
    }

    struct Converter;

    #[async_trait]
    impl PdfConverter for Converter {
        async fn convert(&self, _html: &str, file_name: &str, directory: &Path) -> Result<PathBuf> {
            Ok(directory.join(file_name))
        }
    }

    #[test]
    fn failed_loader_does_not_affect_others() {
        let capabilities = Capabilities::builder(Arc::new(Sheet))
            .file_system(|| Err(Error::CapabilityAbsent(Capability::FileSystem)))
            .pdf_converter(|| Ok(Arc::new(Converter) as Arc<dyn PdfConverter>))
            .native_share(|| Err(Error::Internal("module failed to load".to_string())))
            .build();

        assert_eq!(
            capabilities.set(),
            CapabilitySet {
                has_file_system: false,
                has_pdf_converter: true,
                has_share_module: false,
            }
        );
        assert!(!capabilities.set().all_available());
        assert_eq!(capabilities.set().strategy_label(), "Share");
    }

    #[test]
    fn strategy_label_needs_every_capability() {
        let all = CapabilitySet {
            has_file_system: true,
            has_pdf_converter: true,
            has_share_module: true,
        };
        assert_eq!(all.strategy_label(), "Save");
        assert_eq!(
            CapabilitySet {
                has_pdf_converter: false,
                ..all
            }
            .strategy_label(),
            "Share"
        );
    }
}
