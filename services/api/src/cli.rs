use crate::commands::{run_allocate, run_submit, run_watch, AllocateArgs, SubmitArgs, WatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use placement::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Department Placement",
    about = "Serve the department roster and compute rank-ordered slot allocations",
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
    /// Print the allocation table for a workbook without starting the server
    Allocate(AllocateArgs),
    /// Follow the live roster as one applicant
    Watch(WatchArgs),
    /// Replace one applicant's preference list through the HTTP API
    Submit(SubmitArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding config.csv and roster.csv
    #[arg(long)]
    pub(crate) workbook: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Allocate(args) => run_allocate(args),
        Command::Watch(args) => run_watch(args).await,
        Command::Submit(args) => run_submit(args).await,
    }
}
