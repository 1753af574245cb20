use crate::demo::{run_compose, run_demo, ComposeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use comment_composer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Comment Composer",
    about = "Compose report card final comments from outcome and personalized comment banks",
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
    /// Compose a candidate comment from CSV comment banks
    Compose(ComposeArgs),
    /// Walk through the populate and confirm flow with sample comment banks
    Demo,
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
        Command::Compose(args) => run_compose(args),
        Command::Demo => run_demo(),
    }
}
