pub mod error;
pub mod launch;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use error::AppError;
pub use launch::{LaunchMode, LaunchPlan};
pub use middleware::structured_logger::StructuredLogger;
