use anyhow::Result;
use pd_report::config::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = try_main().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(clap_err) => clap_err.exit(),
            Err(err) => return Err(err),
        },
    };

    let filter = if config.verbose {
        EnvFilter::new("pd_report=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pd_report=info,warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    pd_report::run(&config, &mut out).await?;
    Ok(())
}
