pub mod advisor;
pub mod catalog;
pub mod config;
pub mod economics;
pub mod error;
pub mod limiter;
pub mod telemetry;
