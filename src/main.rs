// src/main.rs

use ecobuild::errors::EcobuildError;
use ecobuild::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            report_error(&err);
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level, args.log_file.as_deref())?;
    run(args).await
}

fn report_error(err: &anyhow::Error) {
    if let Some(EcobuildError::UnknownProjects {
        requested,
        available,
    }) = err.downcast_ref::<EcobuildError>()
    {
        eprintln!("❓ No matching projects found for: {}", requested.join(", "));
        eprintln!("📋 Available projects: {}", available.join(", "));
        return;
    }
    eprintln!("ecobuild error: {err:?}");
}
