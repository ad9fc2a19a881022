use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of inter-protocol relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Fork / umbrella relationship (e.g. a sub-DAO or versioned deployment).
    ParentChild,
    /// Target's yield is sourced from the source protocol.
    YieldSource,
    /// Protocols sharing an ecosystem or token standard.
    SameEcosystem,
    /// Direct smart-contract integration.
    Integration,
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent_child" => Ok(RelationshipType::ParentChild),
            "yield_source" => Ok(RelationshipType::YieldSource),
            "same_ecosystem" => Ok(RelationshipType::SameEcosystem),
            "integration" => Ok(RelationshipType::Integration),
            other => Err(format!("unknown relationship type `{other}`")),
        }
    }
}

/// A directed edge between two protocols. Both endpoints must exist among the
/// snapshot's protocols; edges failing that check are dropped at ingestion.
/// The resulting graph may be cyclic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: RelationshipType,
    /// Edge strength in [0,1].
    pub weight: f64,
    /// Human-readable justification for the edge.
    pub evidence: String,
}
