//! Reconciliation of desired state against a remote snapshot.
//!
//! A reconciler never talks to the network. It takes the declared records
//! and the last observed remote records and produces a [`Plan`]: what to
//! create, what to update in place, and what to delete. The orchestrator
//! applies plans in that order.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

pub mod env;
pub mod shared;
pub mod team;

pub use team::{DesiredMember, MemberUpdate};

/// A record kind that can be matched and diffed against its remote copy.
pub trait Reconcilable: Clone {
    /// Identity used to pair desired and remote records.
    type Key: Eq + Hash + Clone + Debug;

    fn match_key(&self) -> Self::Key;

    /// Remote identifier, if the record exists upstream.
    fn remote_id(&self) -> Option<&str>;

    /// Adopt a remote identifier.
    fn set_remote_id(&mut self, id: String);

    /// Whether `self` (desired) differs from its matched `remote` copy.
    fn needs_update(&self, remote: &Self) -> bool;

    /// Human-readable identity for logs and errors. Never includes values.
    fn label(&self) -> String;
}

/// A matched pair of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<T> {
    /// As last observed upstream; carries the remote ID.
    pub old: T,
    /// As declared.
    pub new: T,
}

/// The operations needed to converge remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan<T> {
    pub to_create: Vec<T>,
    pub to_update: Vec<Pair<T>>,
    pub to_delete: Vec<T>,
    /// Matched records that need no change.
    pub unchanged: Vec<Pair<T>>,
}

impl<T> Default for Plan<T> {
    fn default() -> Self {
        Self {
            to_create: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
            unchanged: Vec::new(),
        }
    }
}

impl<T> Plan<T> {
    /// Whether the plan has no operations.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Number of remote operations.
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

/// Pair desired records with remote ones by match key.
///
/// Desired order is preserved in `to_create`, `to_update` and `unchanged`;
/// remote order in `to_delete`. Each remote record matches at most one
/// desired record.
pub fn compute<T: Reconcilable>(desired: &[T], remote: &[T]) -> Plan<T> {
    let mut by_key: HashMap<T::Key, VecDeque<usize>> = HashMap::new();
    for (idx, r) in remote.iter().enumerate() {
        by_key.entry(r.match_key()).or_default().push_back(idx);
    }

    let mut matched = vec![false; remote.len()];
    let mut plan = Plan::default();

    for d in desired {
        let hit = by_key.get_mut(&d.match_key()).and_then(|q| q.pop_front());
        match hit {
            Some(idx) => {
                matched[idx] = true;
                let pair = Pair {
                    old: remote[idx].clone(),
                    new: d.clone(),
                };
                if d.needs_update(&remote[idx]) {
                    plan.to_update.push(pair);
                } else {
                    plan.unchanged.push(pair);
                }
            }
            None => plan.to_create.push(d.clone()),
        }
    }

    plan.to_delete = remote
        .iter()
        .zip(matched)
        .filter(|(_, m)| !m)
        .map(|(r, _)| r.clone())
        .collect();

    plan
}

/// Rebuild the desired list with remote identifiers attached.
///
/// `ids` maps match keys to the identifier each record ended up with
/// (carried over for matched records, returned by the create call for new
/// ones). Values always come from `desired`.
pub fn merge<T: Reconcilable>(desired: &[T], ids: &HashMap<T::Key, String>) -> Vec<T> {
    desired
        .iter()
        .map(|d| {
            let mut merged = d.clone();
            if let Some(id) = ids.get(&d.match_key()) {
                merged.set_remote_id(id.clone());
            }
            merged
        })
        .collect()
}

/// Identifiers of matched records, keyed for [`merge`].
pub fn matched_ids<T: Reconcilable>(plan: &Plan<T>) -> HashMap<T::Key, String> {
    plan.to_update
        .iter()
        .chain(plan.unchanged.iter())
        .filter_map(|p| p.old.remote_id().map(|id| (p.new.match_key(), id.to_string())))
        .collect()
}
