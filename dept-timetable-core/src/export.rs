use std::{path::PathBuf, sync::Arc};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    Capabilities, CapabilitySet, Error, ExportFormat, ExportOptions, ExportRequest,
    FileDescriptor, Materialized, Result, ShareOutcome, Timetable,
    capability::FileSystem,
    permission::PermissionGate,
    render::{Renderer, file_name, share_title},
};


/// Text content sent through the share sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextPayload {
    Format(ExportFormat),
    /// All four formats back to back
    Composite,
}

/// How one export step reached the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Delivery {
    /// File written but not handed to a native share dialog
    Saved { path: PathBuf },
    /// File handed to the native share dialog
    File { path: PathBuf, outcome: ShareOutcome },
    /// Text handed to the share sheet
    Text {
        payload: TextPayload,
        outcome: ShareOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStep {
    pub request: ExportRequest,
    pub delivery: Delivery,
}

/// Something the user should be told although the export went on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    PermissionDenied { message: String },
    FellBack { request: ExportRequest, reason: String },
}

/// What an export request did
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub request: ExportRequest,
    /// "Save" or "Share"
    pub strategy: &'static str,
    pub steps: Vec<ExportStep>,
    pub notices: Vec<Notice>,
    /// Formats that failed while the remaining ones were still exported
    pub failures: Vec<(ExportFormat, String)>,
}

impl ExportReport {
    fn new(request: ExportRequest, strategy: &'static str) -> Self {
        Self {
            request,
            strategy,
            steps: Vec::new(),
            notices: Vec::new(),
            failures: Vec::new(),
        }
    }
}

struct Run<'a> {
    timetable: &'a Timetable,
    files_allowed: bool,
    report: ExportReport,
}

/// Timetable export engine
///
/// Turns a timetable into text, CSV, HTML or PDF and hands it to the
/// platform share facilities. Every missing or failing capability falls
/// back one tier; sharing plain text through the share sheet is the last
/// tier and its failure is the only error that reaches the caller.
pub struct ExportEngine {
    capabilities: Capabilities,
    permission: PermissionGate,
    renderer: Renderer,
    options: ExportOptions,
    in_flight: Mutex<()>,
}

impl ExportEngine {
    pub fn new(capabilities: Capabilities, permission: PermissionGate, options: ExportOptions) -> Self {
        Self {
            renderer: Renderer::new(options.course_label_width),
            capabilities,
            permission,
            options,
            in_flight: Mutex::new(()),
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities.set()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Probe storage permission when the timetable screen is shown.
    ///
    /// Without a file system there is nothing to grant, so nothing is asked.
    pub async fn activate(&self) -> bool {
        if self.capabilities.file_system.is_none() {
            return true;
        }
        self.permission.activate().await
    }

    /// Export a timetable. Only one export runs at a time.
    pub async fn export(
        &self,
        timetable: &Timetable,
        request: ExportRequest,
    ) -> Result<ExportReport> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| Error::ExportInProgress)?;

        let set = self.capabilities.set();
        tracing::info!(
            "Exporting timetable {} as {} (strategy: {})",
            timetable.id,
            request,
            set.strategy_label()
        );

        let mut run = self.start(timetable, request).await;

        match request {
            ExportRequest::Single(format) => self.export_format(&mut run, format).await?,
            ExportRequest::All if set.all_available() && run.files_allowed => {
                for format in ExportFormat::ALL {
                    if let Err(e) = self.export_format(&mut run, format).await {
                        if !self.options.continue_all_on_error {
                            return Err(e);
                        }
                        tracing::warn!("Exporting {} failed, continuing: {}", format, e);
                        run.report.failures.push((format, e.to_string()));
                    }
                }
            }
            ExportRequest::All => {
                self.direct_share(&mut run, ExportRequest::All, TextPayload::Composite)
                    .await?;
            }
        }

        tracing::info!(
            "Export of {} finished with {} step(s)",
            timetable.id,
            run.report.steps.len()
        );
        Ok(run.report)
    }

    async fn start<'a>(&self, timetable: &'a Timetable, request: ExportRequest) -> Run<'a> {
        let has_file_system = self.capabilities.file_system.is_some();
        let files_allowed = has_file_system && self.permission.ensure_granted().await;
        let mut report = ExportReport::new(request, self.capabilities.set().strategy_label());
        if has_file_system && !files_allowed {
            report.notices.push(Notice::PermissionDenied {
                message: Error::PermissionDenied.user_message(),
            });
        }

        Run {
            timetable,
            files_allowed,
            report,
        }
    }

    async fn export_format(&self, run: &mut Run<'_>, format: ExportFormat) -> Result<()> {
        let materialized = self.materialize(run, format).await?;
        self.share(run, format, materialized).await
    }

    fn file_system(&self, run: &Run<'_>) -> Option<Arc<dyn FileSystem>> {
        if run.files_allowed {
            self.capabilities.file_system.clone()
        } else {
            None
        }
    }

    async fn materialize(&self, run: &mut Run<'_>, format: ExportFormat) -> Result<Materialized> {
        if format == ExportFormat::Pdf {
            return self.materialize_pdf(run).await;
        }

        let request = ExportRequest::Single(format);
        let artifact = self.renderer.artifact(run.timetable, format);

        let Some(fs) = self.file_system(run) else {
            tracing::debug!("No writable file system, sharing {} as text", format);
            self.direct_share(run, request, TextPayload::Format(format))
                .await?;
            return Ok(Materialized::SharedDirectly);
        };

        let path = fs.documents_dir().join(&artifact.file_name);
        match fs.write(&path, &artifact.content).await {
            Ok(()) => {
                tracing::info!("Saved {} timetable to {}", format, path.display());
                Ok(Materialized::File(FileDescriptor {
                    path,
                    file_name: artifact.file_name,
                    mime_type: artifact.mime_type.to_string(),
                }))
            }
            Err(e) => {
                tracing::warn!("Writing {} failed, sharing as text: {}", path.display(), e);
                run.report.notices.push(Notice::FellBack {
                    request,
                    reason: e.to_string(),
                });
                self.direct_share(run, request, TextPayload::Format(format))
                    .await?;
                Ok(Materialized::SharedDirectly)
            }
        }
    }

    async fn materialize_pdf(&self, run: &mut Run<'_>) -> Result<Materialized> {
        let request = ExportRequest::Single(ExportFormat::Pdf);
        let html_payload = TextPayload::Format(ExportFormat::Html);

        let (Some(fs), Some(converter)) =
            (self.file_system(run), self.capabilities.pdf_converter.clone())
        else {
            tracing::debug!("PDF conversion unavailable, sharing HTML instead");
            self.direct_share(run, request, html_payload).await?;
            return Ok(Materialized::SharedDirectly);
        };

        let html = self.renderer.html(run.timetable);
        let pdf_name = file_name(run.timetable, ExportFormat::Pdf);
        match converter.convert(&html, &pdf_name, fs.documents_dir()).await {
            Ok(path) => {
                tracing::info!("Converted timetable to PDF at {}", path.display());
                Ok(Materialized::File(FileDescriptor {
                    path,
                    file_name: pdf_name,
                    mime_type: ExportFormat::Pdf.mime_type().to_string(),
                }))
            }
            Err(e) => {
                tracing::warn!("PDF conversion failed, sharing HTML instead: {}", e);
                run.report.notices.push(Notice::FellBack {
                    request,
                    reason: e.to_string(),
                });
                self.direct_share(run, request, html_payload).await?;
                Ok(Materialized::SharedDirectly)
            }
        }
    }

    async fn share(
        &self,
        run: &mut Run<'_>,
        format: ExportFormat,
        materialized: Materialized,
    ) -> Result<()> {
        let request = ExportRequest::Single(format);
        let file = match materialized {
            Materialized::SharedDirectly => return Ok(()),
            Materialized::File(file) => file,
        };
        let payload = TextPayload::Format(ExportFormat::fallback_for_mime(&file.mime_type));

        let Some(native) = self.capabilities.native_share.clone() else {
            tracing::warn!("Native share missing for {}, sharing as text", file.file_name);
            run.report.steps.push(saved(request, file.path));
            return self.direct_share(run, request, payload).await;
        };

        match native.share_file(&file).await {
            Ok(outcome) => {
                if outcome == ShareOutcome::Cancelled {
                    tracing::info!("Sharing {} was cancelled by the user", file.file_name);
                }
                run.report.steps.push(ExportStep {
                    request,
                    delivery: Delivery::File {
                        path: file.path,
                        outcome,
                    },
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Native share of {} failed: {}", file.file_name, e);
                run.report.notices.push(Notice::FellBack {
                    request,
                    reason: e.to_string(),
                });
                run.report.steps.push(saved(request, file.path));
                self.direct_share(run, request, payload).await
            }
        }
    }

    /// Share the content as a plain message. Needs no file system and is
    /// the last fallback tier.
    async fn direct_share(
        &self,
        run: &mut Run<'_>,
        request: ExportRequest,
        payload: TextPayload,
    ) -> Result<()> {
        let (message, label) = match payload {
            TextPayload::Format(format) => {
                (self.renderer.render(run.timetable, format), format.to_string())
            }
            TextPayload::Composite => (
                self.renderer.composite(run.timetable),
                ExportRequest::All.to_string(),
            ),
        };
        let title = share_title(run.timetable, &label);

        let outcome = self
            .capabilities
            .share_sheet
            .share_text(&message, &title)
            .await
            .map_err(|e| {
                tracing::error!("Share sheet failed for {}: {}", request, e);
                Error::share(request, e)
            })?;

        run.report.steps.push(ExportStep {
            request,
            delivery: Delivery::Text { payload, outcome },
        });
        Ok(())
    }
}

fn saved(request: ExportRequest, path: PathBuf) -> ExportStep {
    ExportStep {
        request,
        delivery: Delivery::Saved { path },
    }
}
