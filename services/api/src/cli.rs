use crate::demo::{
    run_dashboard, run_demo, run_export, run_sla_target, DashboardArgs, DemoArgs, ExportArgs,
    SlaTargetArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hiring_desk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Hiring Desk",
    about = "Serve and inspect the requisition SLA and candidate pipeline engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// SLA policy calculations
    Sla {
        #[command(subcommand)]
        command: SlaCommand,
    },
    /// Print dashboard metrics for a snapshot file
    Dashboard(DashboardArgs),
    /// Write one snapshot collection as CSV
    Export(ExportArgs),
    /// Walk a sample requisition through extension, pipeline, and hire
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum SlaCommand {
    /// Compute the policy target fill date for a start date and layer
    Target(SlaTargetArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON snapshot used to seed the in-memory backend
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Sla {
            command: SlaCommand::Target(args),
        } => run_sla_target(args),
        Command::Dashboard(args) => run_dashboard(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}
