use clap::Parser;
use ghillie_cli::{exit_code, run_cli, Cli};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run_cli(cli).await {
        eprintln!("ghillie: {err}");
        error!(error = %err, "ghillie-cli exited with an error");
        std::process::exit(exit_code(&err));
    }
}
