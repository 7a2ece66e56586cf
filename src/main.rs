use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use gitea_provisioner::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            if e.is_usage() {
                eprint!("{}", Cli::command().render_usage());
                eprintln!();
            }
            ExitCode::from(e.exit_code())
        }
    }
}
