use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;

use crate::model::{Protocol, Relationship, RelationshipType};

/// Default cap on rendered nodes.
const DEFAULT_NODE_LIMIT: usize = 50;

/// Filters applied before the graph is assembled.
#[derive(Debug, Clone, Default)]
pub struct GraphFilters {
    pub category: Option<String>,
    pub chain: Option<String>,
    pub min_tvl: Option<f64>,
    pub rel_type: Option<RelationshipType>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub category: String,
    pub tvl: f64,
    /// Visual weight: log10(tvl+1) * 2, so multi-order-of-magnitude TVL
    /// differences stay comparable on screen.
    pub val: f64,
    /// Total degree (in + out) within the filtered graph.
    pub connections: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: RelationshipType,
    pub weight: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

pub struct RelationshipGraphBuilder;

impl RelationshipGraphBuilder {
    /// Filter protocols, truncate to the TVL-descending top `limit`, and keep
    /// only edges whose endpoints both survive (and match the optional type
    /// filter). Cycles pass through untouched — breaking or flagging them is
    /// the consumer's concern.
    pub fn build(
        protocols: &[&Protocol],
        relationships: &[Relationship],
        filters: &GraphFilters,
    ) -> RelationshipGraph {
        let mut selected: Vec<&Protocol> = protocols
            .iter()
            .copied()
            .filter(|p| {
                filters
                    .category
                    .as_deref()
                    .is_none_or(|c| p.category.eq_ignore_ascii_case(c))
            })
            .filter(|p| filters.chain.as_deref().is_none_or(|c| p.supports_chain(c)))
            .filter(|p| filters.min_tvl.is_none_or(|min| p.tvl >= min))
            .collect();

        selected.sort_by(|a, b| {
            b.tvl
                .partial_cmp(&a.tvl)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        selected.truncate(filters.limit.unwrap_or(DEFAULT_NODE_LIMIT));

        let mut graph = DiGraph::<&Protocol, &Relationship>::new();
        let mut index_map: HashMap<&str, NodeIndex> = HashMap::new();
        for protocol in &selected {
            let idx = graph.add_node(*protocol);
            index_map.insert(protocol.slug.as_str(), idx);
        }

        for rel in relationships {
            if let Some(want) = filters.rel_type {
                if rel.rel_type != want {
                    continue;
                }
            }
            if let (Some(&src), Some(&dst)) = (
                index_map.get(rel.source.as_str()),
                index_map.get(rel.target.as_str()),
            ) {
                graph.add_edge(src, dst, rel);
            }
        }

        let nodes = selected
            .iter()
            .map(|p| {
                let idx = index_map[p.slug.as_str()];
                let connections = graph.neighbors_directed(idx, Direction::Outgoing).count()
                    + graph.neighbors_directed(idx, Direction::Incoming).count();
                GraphNode {
                    id: p.slug.clone(),
                    name: p.name.clone(),
                    category: p.category.clone(),
                    tvl: p.tvl,
                    val: (p.tvl + 1.0).log10() * 2.0,
                    connections,
                }
            })
            .collect();

        let links = graph
            .edge_weights()
            .map(|rel| GraphLink {
                source: rel.source.clone(),
                target: rel.target.clone(),
                rel_type: rel.rel_type,
                weight: rel.weight,
                evidence: rel.evidence.clone(),
            })
            .collect();

        RelationshipGraph { nodes, links }
    }
}
