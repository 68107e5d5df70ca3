use clap::Subcommand;
use deploy_config::DeploymentConfig;

/// How the service is being launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum LaunchMode {
    /// Local development: loopback only, single worker, verbose logs
    Dev,
    /// Production-style start: all interfaces, configured worker count
    Start,
}

/// Resolved server settings for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub host: &'static str,
    pub port: u16,
    /// `None` leaves the worker count to actix-web (one per physical core).
    pub workers: Option<usize>,
    pub default_log_filter: &'static str,
}

impl LaunchPlan {
    pub fn new(mode: LaunchMode, deployment: &DeploymentConfig) -> Self {
        match mode {
            LaunchMode::Dev => Self {
                host: "127.0.0.1",
                port: deployment.port,
                workers: Some(1),
                default_log_filter: "debug,actix_web=debug,actix_server=info",
            },
            LaunchMode::Start => Self {
                host: "0.0.0.0",
                port: deployment.port,
                workers: deployment.workers,
                default_log_filter: "info,actix_web=info",
            },
        }
    }
}
