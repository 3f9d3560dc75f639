pub mod config;
pub mod errors;
pub mod extraction;
pub mod graph;
pub mod pipeline;
pub mod schema;
pub mod topology;
pub mod types;
