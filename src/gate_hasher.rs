// SPDX-License-Identifier: Apache-2.0

//! Structural hashing of gates: a gate is identified by its operation and the
//! identities of its operands, so requesting the same operation over the same
//! operands twice yields the same gate.

use ahash::AHashMap;

use crate::gate::{GateOp, GateRef};

/// Dedup key for a node. Built only through `GateKey::constant` and
/// `GateKey::op`, which canonicalize operand order.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum GateKey {
    Constant(bool),
    Op { op: GateOp, operands: Vec<GateRef> },
}

impl GateKey {
    pub fn constant(value: bool) -> Self {
        GateKey::Constant(value)
    }

    /// Returns the canonical key for `op` over `operands`: mirrored ops are
    /// rewritten to their stored form and commutative operands are sorted by
    /// gate id.
    pub fn op(op: GateOp, operands: &[GateRef]) -> Self {
        let (op, swap) = op.canonical();
        let mut operands = operands.to_vec();
        if swap {
            operands.reverse();
        }
        if op.is_commutative() {
            operands.sort();
        }
        GateKey::Op { op, operands }
    }
}

pub struct GateHasher {
    key_to_ref: AHashMap<GateKey, GateRef>,
    hits: usize,
}

impl GateHasher {
    pub fn new() -> Self {
        Self {
            key_to_ref: AHashMap::new(),
            hits: 0,
        }
    }

    /// Returns the gate previously recorded for `key`, if any.
    pub fn lookup(&mut self, key: &GateKey) -> Option<GateRef> {
        let found = self.key_to_ref.get(key).copied();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    pub fn record(&mut self, key: GateKey, gate_ref: GateRef) {
        let previous = self.key_to_ref.insert(key, gate_ref);
        debug_assert!(
            previous.is_none(),
            "recorded a key that was already present: {:?}",
            previous
        );
    }

    /// Number of lookups that found an existing gate.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.key_to_ref.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_to_ref.is_empty()
    }
}

impl Default for GateHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(id: usize) -> GateRef {
        GateRef { id }
    }

    #[test]
    fn test_commutative_keys_collapse() {
        assert_eq!(
            GateKey::op(GateOp::And, &[r(1), r(2)]),
            GateKey::op(GateOp::And, &[r(2), r(1)])
        );
        assert_eq!(
            GateKey::op(GateOp::Xnor, &[r(7), r(3)]),
            GateKey::op(GateOp::Xnor, &[r(3), r(7)])
        );
    }

    #[test]
    fn test_non_commutative_keys_stay_ordered() {
        assert_ne!(
            GateKey::op(GateOp::Imp, &[r(1), r(2)]),
            GateKey::op(GateOp::Imp, &[r(2), r(1)])
        );
    }

    #[test]
    fn test_mirrored_ops_collapse() {
        assert_eq!(
            GateKey::op(GateOp::If, &[r(1), r(2)]),
            GateKey::op(GateOp::Imp, &[r(2), r(1)])
        );
        assert_eq!(
            GateKey::op(GateOp::Nif, &[r(4), r(5)]),
            GateKey::op(GateOp::Nimp, &[r(5), r(4)])
        );
    }

    #[test]
    fn test_lookup_counts_hits() {
        let mut hasher = GateHasher::new();
        let key = GateKey::op(GateOp::Or, &[r(1), r(2)]);
        assert_eq!(hasher.lookup(&key), None);
        hasher.record(key.clone(), r(3));
        assert_eq!(hasher.lookup(&GateKey::op(GateOp::Or, &[r(2), r(1)])), Some(r(3)));
        assert_eq!(hasher.hits(), 1);
        assert_eq!(hasher.len(), 1);
    }
}
