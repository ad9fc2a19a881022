pub mod graph;
pub mod protocols;
pub mod spreads;

pub use graph::{GraphFilters, GraphLink, GraphNode, RelationshipGraph, RelationshipGraphBuilder};
pub use protocols::{CrossProtocolHighlights, ProtocolAggregator, ProtocolSummary};
pub use spreads::{Confidence, SpreadDetector, SpreadPool, YieldSpread};
