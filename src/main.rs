use std::process::ExitCode;

use clap::Parser;
use classroom_dl::{run, Config, Error, ErrorKind};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("classroom_dl=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdin = BufReader::new(tokio::io::stdin());
    match run(&config, stdin, &mut std::io::stdout()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e.downcast_ref::<Error>().map_or(ErrorKind::Unknown, Error::kind);
            eprintln!("{kind} error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
