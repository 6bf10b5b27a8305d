mod commands;
mod config;
mod platform;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dept_timetable_core::{ExportFormat, ExportRequest, Semester};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dept-timetable")]
#[command(about = "Department timetable export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Timetable dataset (JSON); the bundled sample is used when omitted
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,
}

#[derive(Args)]
struct CapabilityArgs {
    /// Directory exported files are written into
    #[arg(long)]
    documents_dir: Option<PathBuf>,

    /// Enable file sharing by copying shared files into this directory
    #[arg(long)]
    share_dir: Option<PathBuf>,

    /// Run as if no file system were available
    #[arg(long)]
    no_files: bool,

    /// Run as if no PDF converter were available
    #[arg(long)]
    no_pdf: bool,
}

impl From<CapabilityArgs> for commands::CapabilityParams {
    fn from(args: CapabilityArgs) -> Self {
        Self {
            documents_dir: args.documents_dir,
            share_dir: args.share_dir,
            no_files: args.no_files,
            no_pdf: args.no_pdf,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available timetables
    List,

    /// Print a timetable in one format
    Show {
        /// Academic level, e.g. "Level 100"
        #[arg(short, long)]
        level: String,

        /// Semester (First, Second, Third)
        #[arg(short, long, default_value = "First")]
        semester: Semester,

        /// Output format (text, csv, html, pdf)
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,
    },

    /// Export and share a timetable
    Export {
        /// Academic level, e.g. "Level 100"
        #[arg(short, long)]
        level: String,

        /// Semester (First, Second, Third)
        #[arg(short, long, default_value = "First")]
        semester: Semester,

        /// Export format (text, csv, html, pdf, all)
        #[arg(short, long, default_value = "text")]
        format: ExportRequest,

        /// Keep exporting the remaining formats of "all" after a failure
        #[arg(long)]
        continue_on_error: bool,

        #[command(flatten)]
        capabilities: CapabilityArgs,
    },

    /// Show which platform capabilities are available
    Capabilities {
        #[command(flatten)]
        capabilities: CapabilityArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("dept_timetable_cli={0},dept_timetable_core={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::List => commands::list_command(cli.data).await,

        Commands::Show {
            level,
            semester,
            format,
        } => commands::show_command(cli.data, level, semester, format).await,

        Commands::Export {
            level,
            semester,
            format,
            continue_on_error,
            capabilities,
        } => {
            commands::export_command(commands::ExportParams {
                data: cli.data,
                level,
                semester,
                request: format,
                capabilities: capabilities.into(),
                continue_on_error,
            })
            .await
        }

        Commands::Capabilities { capabilities, json } => {
            commands::capabilities_command(capabilities.into(), json).await
        }
    }
}
