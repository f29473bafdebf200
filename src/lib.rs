pub mod config;
pub mod entities;
pub mod error;
pub mod http;

pub use entities::{ApplicationPlan, Limit, LimitAttrs, Metric, MetricRef, Period, Service};
pub use error::{Error, RemoteError, Result};
