pub mod analytics;
pub mod api;
pub mod cli;
pub mod ingest;
pub mod insight;
pub mod model;
pub mod query;
pub mod report;
pub mod schema;
pub mod score;
