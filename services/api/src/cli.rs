use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use underwriting::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Underwriting Services",
    about = "Run the proposal and hiring services, or walk a hiring demo end to end",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the proposal service (default command)
    Proposals(ServeArgs),
    /// Start the hiring service
    Hiring(HiringArgs),
    /// Run both services in-process and hire a proposal through them
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct HiringArgs {
    #[command(flatten)]
    pub(crate) serve: ServeArgs,
    /// Base URL of the proposal read path, e.g. http://127.0.0.1:3000/proposals
    #[arg(long)]
    pub(crate) proposal_service_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Proposals(ServeArgs::default()));

    match command {
        Command::Proposals(args) => server::run_proposals(args).await,
        Command::Hiring(args) => server::run_hiring(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
