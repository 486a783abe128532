mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Logging starts inside run_from_args, once --root and the config are known.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("assetpipe error: {:#}", err);
        std::process::exit(1);
    }
}
