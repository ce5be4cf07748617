pub mod cli;
pub mod config;
pub mod conversion;
pub mod costing;
pub mod forecast;
pub mod model;
pub mod report;
pub mod store;
