use std::{fs, path::PathBuf, sync::Arc};

use anyhow::Result;
use chrono::Local;
use dept_timetable_core::prelude::*;

use crate::{
    config::Settings,
    platform::{
        DirectoryPermission, ExternalPdfConverter, LocalFileSystem, OutboxShare, StdoutShareSheet,
    },
};

/// Which platform capabilities the export may use
pub struct CapabilityParams {
    pub documents_dir: Option<PathBuf>,
    pub share_dir: Option<PathBuf>,
    pub no_files: bool,
    pub no_pdf: bool,
}

/// Export command parameters
pub struct ExportParams {
    pub data: Option<PathBuf>,
    pub level: String,
    pub semester: Semester,
    pub request: ExportRequest,
    pub capabilities: CapabilityParams,
    pub continue_on_error: bool,
}

fn load_catalog(data: Option<&PathBuf>) -> Result<TimetableCatalog> {
    let catalog = match data {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            TimetableCatalog::from_json(&content)?
        }
        None => TimetableCatalog::sample()?,
    };
    tracing::debug!("Loaded {} timetable(s)", catalog.all().len());
    Ok(catalog)
}

/// Probe the desktop capabilities once.
fn probe_capabilities(params: &CapabilityParams) -> (Capabilities, Settings) {
    let settings = Settings::from_env().with_documents_dir(params.documents_dir.clone());

    let capabilities = Capabilities::builder(Arc::new(StdoutShareSheet))
        .file_system(|| {
            if params.no_files {
                return Err(dept_timetable_core::Error::CapabilityAbsent(
                    Capability::FileSystem,
                ));
            }
            let fs = LocalFileSystem::new(settings.documents_dir.clone())?;
            Ok(Arc::new(fs) as Arc<dyn FileSystem>)
        })
        .pdf_converter(|| {
            if params.no_pdf {
                return Err(dept_timetable_core::Error::CapabilityAbsent(
                    Capability::PdfConverter,
                ));
            }
            let converter = ExternalPdfConverter::locate(&settings.pdf_command)?;
            Ok(Arc::new(converter) as Arc<dyn PdfConverter>)
        })
        .native_share(|| match &params.share_dir {
            Some(dir) => Ok(Arc::new(OutboxShare::new(dir.clone())?) as Arc<dyn NativeShare>),
            None => Err(dept_timetable_core::Error::CapabilityAbsent(
                Capability::NativeShare,
            )),
        })
        .build();

    (capabilities, settings)
}

/// List timetables command
pub async fn list_command(data: Option<PathBuf>) -> Result<()> {
    let catalog = load_catalog(data.as_ref())?;

    println!("Available timetables:");
    for timetable in catalog.all() {
        println!(
            "  {} - {} ({} {} Semester, {} classes)",
            timetable.id,
            timetable.name,
            timetable.academic_year,
            timetable.semester,
            timetable.slots.len()
        );
    }

    Ok(())
}

/// Print one format of a timetable command
pub async fn show_command(
    data: Option<PathBuf>,
    level: String,
    semester: Semester,
    format: ExportFormat,
) -> Result<()> {
    let catalog = load_catalog(data.as_ref())?;
    let selection = catalog.select(&level, semester);
    if !selection.matched {
        eprintln!(
            "Timetable not found for {} {} Semester, showing {}",
            level, semester, selection.timetable.name
        );
    }

    print!("{}", Renderer::default().render(selection.timetable, format));
    Ok(())
}

/// Capability probe command
pub async fn capabilities_command(params: CapabilityParams, json: bool) -> Result<()> {
    let (capabilities, settings) = probe_capabilities(&params);
    let set = capabilities.set();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "capabilities": set,
                "strategy": set.strategy_label(),
                "documentsDir": settings.documents_dir,
            }))?
        );
        return Ok(());
    }

    let mark = |present: bool| if present { "✓" } else { "✗" };
    println!("Platform capabilities:");
    println!("  {} file system ({})", mark(set.has_file_system), settings.documents_dir.display());
    println!("  {} PDF converter ({})", mark(set.has_pdf_converter), settings.pdf_command);
    println!("  {} native share", mark(set.has_share_module));
    println!("Export action: {}", set.strategy_label());

    Ok(())
}

/// Export a timetable command
pub async fn export_command(params: ExportParams) -> Result<()> {
    let catalog = load_catalog(params.data.as_ref())?;
    let (capabilities, settings) = probe_capabilities(&params.capabilities);

    let permission = PermissionGate::new(DirectoryPermission::new(settings.documents_dir.clone()));
    let options = ExportOptions {
        continue_all_on_error: params.continue_on_error,
        ..ExportOptions::default()
    };
    let engine = ExportEngine::new(capabilities, permission, options);

    if !engine.activate().await {
        eprintln!("{}", dept_timetable_core::Error::PermissionDenied.user_message());
    }

    let selection = catalog.select(&params.level, params.semester);
    if !selection.matched {
        eprintln!(
            "Timetable not found for {} {} Semester, exporting {} instead",
            params.level, params.semester, selection.timetable.name
        );
    }

    tracing::info!(
        "Starting export: timetable={}, request={}",
        selection.timetable.id,
        params.request
    );

    let report = match engine.export(selection.timetable, params.request).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            anyhow::bail!("{}", e.user_message());
        }
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &ExportReport) {
    println!(
        "{} export of {} finished at {}",
        report.strategy,
        report.request,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    for step in &report.steps {
        match &step.delivery {
            Delivery::Saved { path } => {
                println!("✓ {}: saved to {}", step.request, path.display())
            }
            Delivery::File { path, outcome } => {
                println!("✓ {}: saved to {} ({:?})", step.request, path.display(), outcome)
            }
            Delivery::Text { payload, outcome } => {
                let shared = match payload {
                    TextPayload::Format(format) => format.to_string(),
                    TextPayload::Composite => "all formats".to_string(),
                };
                println!("✓ {}: shared as {} text ({:?})", step.request, shared, outcome)
            }
        }
    }

    for notice in &report.notices {
        match notice {
            Notice::PermissionDenied { message } => println!("! {}", message),
            Notice::FellBack { request, reason } => {
                println!("! {} fell back to text sharing: {}", request, reason)
            }
        }
    }

    for (format, reason) in &report.failures {
        println!("✗ {} failed: {}", format, reason);
    }
}
