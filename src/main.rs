// src/main.rs
use clap::Parser;
use kube_user_csr::{app, config::Args, utils::logging::init_logging};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments; a missing --username prints usage and exits
    let args = Args::parse();
    init_logging(args.debug);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    match app::run(&args, &shutdown).await {
        Ok(issued) => {
            println!("{}", issued.certificate.summary());
            println!("Kubeconfig written to {}", issued.output_file.display());
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("error: {}", failure);
            ExitCode::from(failure.exit_code())
        }
    }
}
