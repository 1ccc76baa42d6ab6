//! Link rank computation over a finished crawl graph
//!
//! Ranks are computed by plain power iteration: each node's new rank is the
//! sum of `rank(u) / out_degree(u)` over every node `u` linking to it. There is
//! no damping or random-jump term. Only links between ranked nodes take part,
//! so a link to a page that was never fetched does not count toward
//! `out_degree`. Nodes without outbound links contribute nothing to anyone.
//! After the loop the ranks are normalized to sum to 1.

use crate::config::RankConfig;
use crate::storage::Adjacency;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_MAX_ITERATIONS: u32 = 20;
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-5;

/// Normalized rank per URL
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankTable {
    ranks: HashMap<String, f64>,
}

impl RankTable {
    pub fn get(&self, url: &str) -> Option<f64> {
        self.ranks.get(url).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.ranks.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ranks.iter().map(|(url, rank)| (url.as_str(), *rank))
    }

    /// Entries sorted by rank descending, ties by URL
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl From<HashMap<String, f64>> for RankTable {
    fn from(ranks: HashMap<String, f64>) -> Self {
        Self { ranks }
    }
}

/// Iterative rank propagation with an iteration cap and convergence cutoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankEngine {
    pub max_iterations: u32,
    pub convergence_threshold: f64,
}

impl Default for RankEngine {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }
}

impl From<&RankConfig> for RankEngine {
    fn from(config: &RankConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            convergence_threshold: config.convergence_threshold,
        }
    }
}

impl RankEngine {
    pub fn new(max_iterations: u32, convergence_threshold: f64) -> Self {
        Self {
            max_iterations,
            convergence_threshold,
        }
    }

    /// Computes the rank of every node in `nodes` from the outbound adjacency `graph`
    ///
    /// In-neighbors are found by scanning the whole adjacency for every node on
    /// every iteration, which is fine for crawl-sized graphs only. Edges whose
    /// source or target is not in `nodes` are ignored.
    pub fn compute(&self, nodes: &[String], graph: &Adjacency) -> RankTable {
        if nodes.is_empty() {
            return RankTable::default();
        }

        let graph = &restrict_to_nodes(nodes, graph);

        let initial = 1.0 / nodes.len() as f64;
        let mut ranks: HashMap<String, f64> =
            nodes.iter().map(|node| (node.clone(), initial)).collect();

        for iteration in 0..self.max_iterations {
            let mut next = HashMap::with_capacity(ranks.len());
            let mut delta = 0.0;

            for node in nodes {
                let incoming: f64 = in_neighbors(node, graph)
                    .map(|neighbor| {
                        let out_degree = out_degree(neighbor, graph);
                        if out_degree == 0 {
                            return 0.0;
                        }
                        ranks.get(neighbor).copied().unwrap_or(0.0) / out_degree as f64
                    })
                    .sum();

                delta += (incoming - ranks[node]).abs();
                next.insert(node.clone(), incoming);
            }

            ranks = next;

            if delta < self.convergence_threshold {
                tracing::debug!(
                    "Rank converged after {} iterations (delta {:e})",
                    iteration + 1,
                    delta
                );
                break;
            }
        }

        normalize(&mut ranks);
        RankTable::from(ranks)
    }
}

/// Computes ranks with the default iteration cap and threshold
pub fn compute_rank(nodes: &[String], graph: &Adjacency) -> RankTable {
    RankEngine::default().compute(nodes, graph)
}

/// Keeps only the edges of `graph` that run between members of `nodes`
pub fn restrict_to_nodes(nodes: &[String], graph: &Adjacency) -> Adjacency {
    let members: HashSet<&str> = nodes.iter().map(String::as_str).collect();

    graph
        .iter()
        .filter(|(source, _)| members.contains(source.as_str()))
        .map(|(source, targets)| {
            let kept = targets
                .iter()
                .filter(|target| members.contains(target.as_str()))
                .cloned()
                .collect::<HashSet<_>>();
            (source.clone(), kept)
        })
        .collect()
}

/// Nodes with an edge pointing at `node`
pub fn in_neighbors<'a>(node: &'a str, graph: &'a Adjacency) -> impl Iterator<Item = &'a str> {
    graph
        .iter()
        .filter(move |(_, targets)| targets.contains(node))
        .map(|(source, _)| source.as_str())
}

pub fn out_degree(node: &str, graph: &Adjacency) -> usize {
    graph.get(node).map_or(0, |targets| targets.len())
}

/// Number of `nodes` whose outbound links include `url`
pub fn in_degree(url: &str, nodes: &[String], graph: &Adjacency) -> usize {
    nodes
        .iter()
        .filter(|node| {
            graph
                .get(node.as_str())
                .is_some_and(|targets| targets.contains(url))
        })
        .count()
}

/// Scales ranks to sum to 1. When every rank has drained to zero (no node
/// receives any links) the distribution falls back to uniform.
fn normalize(ranks: &mut HashMap<String, f64>) {
    let total: f64 = ranks.values().sum();
    if total > 0.0 && total.is_finite() {
        for rank in ranks.values_mut() {
            *rank /= total;
        }
    } else {
        let uniform = 1.0 / ranks.len() as f64;
        for rank in ranks.values_mut() {
            *rank = uniform;
        }
    }
}
