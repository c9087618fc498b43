use crate::demo::{run_demo, run_match_report, DemoArgs, MatchReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use workforce_match::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Workforce Match",
    about = "Match construction labour supply to project demand from the command line",
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
    /// Run a matching pass over a workforce snapshot
    Matches {
        #[command(subcommand)]
        command: MatchesCommand,
    },
    /// Run an end-to-end demo covering matching and allocation
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum MatchesCommand {
    /// Print portfolio matches and the recruitment demand summary
    Report(MatchReportArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Matches {
            command: MatchesCommand::Report(args),
        } => run_match_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
