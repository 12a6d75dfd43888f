use crate::report::{run_ask, run_catalog, run_signals, AskArgs, CatalogArgs, SignalsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use insightplug::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "InsightPlug",
    about = "Serve or explore EV ownership economics from the command line",
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
    /// Derive the economic signals for one region and vehicle
    Signals(SignalsArgs),
    /// List the reference catalog
    Catalog(CatalogArgs),
    /// Ask the advisor a question about a region and vehicle
    Ask(AskArgs),
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
        Command::Signals(args) => run_signals(args),
        Command::Catalog(args) => run_catalog(args),
        Command::Ask(args) => run_ask(args).await,
    }
}
