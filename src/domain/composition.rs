//! Weighted instrument composition graph.
//!
//! Nodes live in an arena addressed by index; edges run from a compound
//! instrument to each of its components. Resolution flattens a compound
//! into its atomic constituents, multiplying weights along each path and
//! summing contributions that reach the same atomic instrument by several
//! paths. Traversal is iterative and bounded by [`ResolveLimits`].

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::error::EsgError;

pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_VISITS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveLimits {
    /// Maximum number of compound instruments on a single path.
    pub max_depth: usize,
    /// Maximum number of edges followed in one resolution.
    pub max_visits: usize,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        ResolveLimits {
            max_depth: DEFAULT_MAX_DEPTH,
            max_visits: DEFAULT_MAX_VISITS,
        }
    }
}

/// Look-through weights keyed by atomic instrument id.
pub type Resolution = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default)]
pub struct CompositionGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    children: Vec<Vec<(usize, f64)>>,
    limits: ResolveLimits,
}

struct Frame {
    node: usize,
    weight: f64,
    next: usize,
}

pub fn validate_weight(owner: &str, target: &str, weight: f64) -> Result<(), EsgError> {
    if weight.is_finite() && weight > 0.0 && weight <= 1.0 {
        Ok(())
    } else {
        Err(EsgError::InvalidWeight {
            owner: owner.to_string(),
            target: target.to_string(),
            weight,
        })
    }
}

/// Fails unless `weights` sum to one within `tolerance`.
pub fn check_weight_sum<I>(owner: &str, weights: I, tolerance: f64) -> Result<(), EsgError>
where
    I: IntoIterator<Item = f64>,
{
    let sum: f64 = weights.into_iter().sum();
    if (sum - 1.0).abs() <= tolerance {
        Ok(())
    } else {
        Err(EsgError::InconsistentWeights {
            owner: owner.to_string(),
            sum,
        })
    }
}

impl CompositionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ResolveLimits) -> Self {
        CompositionGraph {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> ResolveLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: ResolveLimits) {
        self.limits = limits;
    }

    fn intern(&mut self, id: &str) -> usize {
        if let Some(&i) = self.index.get(id) {
            return i;
        }
        let i = self.ids.len();
        self.ids.push(id.to_string());
        self.index.insert(id.to_string(), i);
        self.children.push(Vec::new());
        i
    }

    /// Adds or replaces the edge `compound -> component`.
    ///
    /// Only the weight range is checked here; sum-to-one is a property of the
    /// full child set, see [`CompositionGraph::check_weights`].
    pub fn add_component(
        &mut self,
        compound_id: &str,
        component_id: &str,
        weight: f64,
    ) -> Result<(), EsgError> {
        validate_weight(compound_id, component_id, weight)?;
        let compound = self.intern(compound_id);
        let component = self.intern(component_id);

        let edges = &mut self.children[compound];
        match edges.iter_mut().find(|(c, _)| *c == component) {
            Some(edge) => edge.1 = weight,
            None => edges.push((component, weight)),
        }
        Ok(())
    }

    /// Removes every outgoing edge of `compound_id`, making it atomic.
    pub fn clear_components(&mut self, compound_id: &str) {
        if let Some(&i) = self.index.get(compound_id) {
            self.children[i].clear();
        }
    }

    pub fn is_atomic(&self, id: &str) -> bool {
        self.index
            .get(id)
            .is_none_or(|&i| self.children[i].is_empty())
    }

    pub fn components(&self, compound_id: &str) -> Vec<(&str, f64)> {
        match self.index.get(compound_id) {
            Some(&i) => self.children[i]
                .iter()
                .map(|&(c, w)| (self.ids[c].as_str(), w))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn weight_sum(&self, compound_id: &str) -> f64 {
        self.components(compound_id).iter().map(|(_, w)| w).sum()
    }

    /// Ids of every instrument with at least one component, in insertion order.
    pub fn compounds(&self) -> impl Iterator<Item = &str> {
        self.ids
            .iter()
            .zip(&self.children)
            .filter(|(_, edges)| !edges.is_empty())
            .map(|(id, _)| id.as_str())
    }

    /// Reports whether the direct components of `compound_id` sum to one.
    /// Atomic instruments have nothing to check.
    pub fn check_weights(&self, compound_id: &str, tolerance: f64) -> Result<(), EsgError> {
        if self.is_atomic(compound_id) {
            return Ok(());
        }
        let weights = self.components(compound_id).into_iter().map(|(_, w)| w);
        check_weight_sum(compound_id, weights, tolerance)
    }

    pub fn resolve(&self, instrument_id: &str) -> Result<Resolution, EsgError> {
        self.flatten(instrument_id, |_| Ok(()))
    }

    /// Like [`CompositionGraph::resolve`], but also fails if any compound
    /// reached on the way has components that do not sum to one.
    pub fn resolve_checked(
        &self,
        instrument_id: &str,
        tolerance: f64,
    ) -> Result<Resolution, EsgError> {
        self.flatten(instrument_id, |compound| {
            self.check_weights(compound, tolerance)
        })
    }

    fn flatten<F>(&self, instrument_id: &str, mut on_compound: F) -> Result<Resolution, EsgError>
    where
        F: FnMut(&str) -> Result<(), EsgError>,
    {
        let root = match self.index.get(instrument_id) {
            Some(&i) if !self.children[i].is_empty() => i,
            _ => return Ok(BTreeMap::from([(instrument_id.to_string(), 1.0)])),
        };

        let mut checked = vec![false; self.ids.len()];
        let mut on_path = vec![false; self.ids.len()];
        let mut totals: HashMap<usize, f64> = HashMap::new();
        let mut visits = 0usize;

        on_compound(&self.ids[root])?;
        checked[root] = true;
        on_path[root] = true;
        let mut stack = vec![Frame {
            node: root,
            weight: 1.0,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            if frame.next == self.children[node].len() {
                on_path[node] = false;
                stack.pop();
                continue;
            }
            let (child, edge_weight) = self.children[node][frame.next];
            frame.next += 1;
            let weight = frame.weight * edge_weight;

            visits += 1;
            if visits > self.limits.max_visits {
                return Err(EsgError::TraversalLimit {
                    instrument: instrument_id.to_string(),
                    limit: "visit",
                    max: self.limits.max_visits,
                });
            }
            if on_path[child] {
                return Err(EsgError::CyclicComposition {
                    instrument: self.ids[child].clone(),
                });
            }

            if self.children[child].is_empty() {
                *totals.entry(child).or_insert(0.0) += weight;
                continue;
            }

            if stack.len() >= self.limits.max_depth {
                return Err(EsgError::TraversalLimit {
                    instrument: instrument_id.to_string(),
                    limit: "depth",
                    max: self.limits.max_depth,
                });
            }
            if !checked[child] {
                on_compound(&self.ids[child])?;
                checked[child] = true;
            }
            on_path[child] = true;
            stack.push(Frame {
                node: child,
                weight,
                next: 0,
            });
        }

        debug!(
            instrument = instrument_id,
            atomics = totals.len(),
            visits,
            "resolved composition"
        );

        Ok(totals
            .into_iter()
            .map(|(i, w)| (self.ids[i].clone(), w))
            .collect())
    }
}
