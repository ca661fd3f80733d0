// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::gate::{Circuit, Gate, GateRef};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SummaryStats {
    /// Operation gates, live or not.
    pub gate_count: usize,
    /// Operation gates that some output depends on.
    pub live_gates: usize,
    /// Number of operation gates on the longest input-to-output path.
    pub depth: usize,
    /// Largest number of uses of any single node (outputs count as uses).
    pub max_fanout: usize,
    /// Live operation gates per mnemonic.
    pub op_histogram: BTreeMap<String, usize>,
}

/// Computes a use count for the nodes reachable from the outputs.
pub fn get_id_to_use_count(circuit: &Circuit) -> HashMap<GateRef, usize> {
    let mut id_to_use_count: HashMap<GateRef, usize> = HashMap::new();
    let mut processed = HashSet::new();
    let mut worklist = Vec::new();
    for output in &circuit.outputs {
        for gate_ref in &output.gates {
            *id_to_use_count.entry(*gate_ref).or_insert(0) += 1;
            worklist.push(*gate_ref);
        }
    }
    while let Some(gate_ref) = worklist.pop() {
        if !processed.insert(gate_ref) {
            continue;
        }
        for operand in circuit.get(gate_ref).get_operands() {
            *id_to_use_count.entry(*operand).or_insert(0) += 1;
            worklist.push(*operand);
        }
    }
    id_to_use_count
}

/// Depth of every node in gates: inputs and constants are at depth 0.
pub fn get_gate_depths(circuit: &Circuit) -> Vec<usize> {
    let mut depths = vec![0; circuit.gates.len()];
    for (id, gate) in circuit.gates.iter().enumerate() {
        if let Gate::Op { operands, .. } = gate {
            depths[id] = 1 + operands.iter().map(|o| depths[o.id]).max().unwrap_or(0);
        }
    }
    depths
}

pub fn get_summary_stats(circuit: &Circuit) -> SummaryStats {
    let id_to_use_count = get_id_to_use_count(circuit);
    let depths = get_gate_depths(circuit);

    let mut op_histogram = BTreeMap::new();
    let mut live_gates = 0;
    for gate_ref in id_to_use_count.keys() {
        if let Gate::Op { op, .. } = circuit.get(*gate_ref) {
            live_gates += 1;
            *op_histogram.entry(op.mnemonic().to_string()).or_insert(0) += 1;
        }
    }
    let depth = circuit
        .outputs
        .iter()
        .flat_map(|p| p.gates.iter())
        .map(|g| depths[g.id])
        .max()
        .unwrap_or(0);

    SummaryStats {
        gate_count: circuit.gate_count(),
        live_gates,
        depth,
        max_fanout: id_to_use_count.values().copied().max().unwrap_or(0),
        op_histogram,
    }
}
