use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use clap::Parser;
use deploy_config::DeploymentConfig;
use example_service::{routes, telemetry, AppError, LaunchMode, LaunchPlan, StructuredLogger};
use tracing::info;

#[derive(Parser)]
#[command(name = "example-service")]
#[command(about = "Minimal HTTP example service")]
struct Cli {
    #[command(subcommand)]
    mode: LaunchMode,

    /// Service manifest with a [deployment] table (defaults to $SERVICE_MANIFEST or service.toml)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,
}

fn load_deployment(manifest: Option<PathBuf>) -> Result<DeploymentConfig, AppError> {
    let config = match manifest {
        Some(path) => DeploymentConfig::load(path)?,
        None => DeploymentConfig::discover()?,
    };
    Ok(config)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let deployment = match load_deployment(cli.manifest) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load deployment config: {e}");
            std::process::exit(1);
        }
    };

    let plan = LaunchPlan::new(cli.mode, &deployment);
    telemetry::init_tracing(plan.default_log_filter);

    info!(
        mode = ?cli.mode,
        host = plan.host,
        port = plan.port,
        workers = ?plan.workers,
        "starting example service"
    );

    let mut server = HttpServer::new(|| {
        App::new()
            .wrap(StructuredLogger)
            .configure(routes::configure)
            .default_service(web::to(routes::not_found))
    });
    if let Some(workers) = plan.workers {
        server = server.workers(workers);
    }

    server.bind((plan.host, plan.port))?.run().await
}
