pub mod app;
pub mod clock;
pub mod coerce;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progression;
pub mod sheets;
pub mod store;
