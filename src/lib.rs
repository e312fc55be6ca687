pub mod analytics;
pub mod api;
pub mod catalog;
pub mod config;
pub mod config_page;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod value;
