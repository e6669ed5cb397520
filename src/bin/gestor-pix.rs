use {
    clap::Parser,
    gestor_pix::{Action, GestorPix, config::GestorPixConfig, logging::init_logging, metrics},
    std::process::ExitCode,
    tracing::error,
};

#[derive(Parser, Debug)]
#[command(version, about = "Manage PIX customers through the customer API", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Print request metrics after the action finishes
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    action: Action,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = GestorPixConfig::from_file(&args.config)
        .map_err(|e| format!("Failed to load configuration file: {}", e))?;

    init_logging(config.debug, &config.logging.directory)
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    let mut app = GestorPix::new(config)?;
    let outcome = app.run(args.action).await;

    if args.metrics {
        print!("{}", metrics::render()?);
    }

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("Action failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
