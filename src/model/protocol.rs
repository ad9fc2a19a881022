use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A DeFi protocol known to the snapshot. Pools reference protocols by slug.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub slug: String,
    pub name: String,
    /// Free-form category from the feed (e.g. "Lending", "Dexes", "Yield").
    pub category: String,
    pub chains: Vec<String>,
    /// Protocol-level TVL in USD.
    pub tvl: f64,
    /// External reputation input in [0,100]; higher = more mature / better
    /// audited. Absent means unknown, which scores conservatively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_score: Option<f64>,
}

impl Protocol {
    pub fn supports_chain(&self, chain: &str) -> bool {
        self.chains.iter().any(|c| c.eq_ignore_ascii_case(chain))
    }
}
