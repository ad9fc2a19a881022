pub mod graph;
pub mod insights;
pub mod pools;
pub mod protocols;
pub mod schema;
pub mod snapshot;
pub mod spreads;
