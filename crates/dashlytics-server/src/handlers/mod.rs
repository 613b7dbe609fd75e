//! HTTP handlers for the Dashlytics REST API.
//!
//! This module organizes handlers by domain:
//! - `health`: Health check endpoints
//! - `analytics`: Stateless engine operations over request payloads
//! - `sales`: Cached demo sales dashboard
//! - `cache`: Result cache inspection and reset

pub mod analytics;
pub mod cache;
pub mod health;
pub mod sales;

pub use analytics::{aggregate, growth, moving_average, percentile, timeseries};
pub use cache::{cache_stats, clear_cache};
pub use health::health_check;
pub use sales::sales_dashboard;
