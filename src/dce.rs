// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};

use crate::gate::{Circuit, Gate, GateRef, Port};

fn live_gates(circuit: &Circuit) -> HashSet<GateRef> {
    let mut reachable = HashSet::new();
    let mut worklist: Vec<GateRef> = circuit
        .outputs
        .iter()
        .flat_map(|p| p.gates.iter().copied())
        .collect();
    while let Some(current) = worklist.pop() {
        if !reachable.insert(current) {
            continue;
        }
        worklist.extend_from_slice(circuit.get(current).get_operands());
    }
    reachable
}

/// Worklist-based DCE: returns a copy of `circuit` without the gates no
/// output depends on. Inputs are always kept so the signature is unchanged.
/// Tracing never calls this; it is up to the consumer of the circuit.
pub fn prune(circuit: &Circuit) -> Circuit {
    let mut keep = live_gates(circuit);
    for input in &circuit.inputs {
        keep.extend(input.gates.iter().copied());
    }

    let mut new_gates = Vec::with_capacity(keep.len());
    let mut old_to_new: HashMap<usize, usize> = HashMap::new();
    for (id, gate) in circuit.gates.iter().enumerate() {
        if !keep.contains(&GateRef { id }) {
            continue;
        }
        let new_id = new_gates.len();
        let mut new_gate = gate.clone();
        if let Gate::Op { operands, .. } = &mut new_gate {
            for operand in operands.iter_mut() {
                // Operands precede their users, so they are already mapped.
                operand.id = old_to_new[&operand.id];
            }
        }
        old_to_new.insert(id, new_id);
        new_gates.push(new_gate);
    }

    let remap_port = |port: &Port| Port {
        name: port.name.clone(),
        shape: port.shape,
        gates: port
            .gates
            .iter()
            .map(|g| GateRef {
                id: old_to_new[&g.id],
            })
            .collect(),
    };
    let result = Circuit {
        name: circuit.name.clone(),
        gates: new_gates,
        inputs: circuit.inputs.iter().map(remap_port).collect(),
        outputs: circuit.outputs.iter().map(remap_port).collect(),
    };
    log::debug!(
        "dce `{}`: {} => {} nodes",
        circuit.name,
        circuit.node_count(),
        result.node_count()
    );
    debug_assert!(result.check_invariants().is_ok());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit::Bit;
    use crate::gate::Shape;
    use crate::synthesize::Signal;
    use crate::trace::Trace;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prune_drops_dead_gates() {
        let mut cx = Trace::new("dead");
        let a = cx.input_bit("a").unwrap();
        let b = cx.input_bit("b").unwrap();
        let c = cx.input_bit("c").unwrap();
        let _unused = a.xor(&mut cx, c).unwrap();
        let _also_unused = a.and(&mut cx, Bit::ONE).unwrap();
        let o = a.or(&mut cx, b).unwrap();
        cx.output("o", Shape::Bit, &Signal::Bit(o)).unwrap();
        let circuit = cx.finish().unwrap();
        assert_eq!(circuit.gate_count(), 3);

        let pruned = prune(&circuit);
        assert_eq!(pruned.gate_count(), 1);
        assert_eq!(pruned.node_count(), 4);
        assert_eq!(
            pruned.to_string(),
            "fn dead(a: bit = [%0], b: bit = [%1], c: bit = [%2]) -> (o: bit = [%3]) {
  %3 = or(a[0], b[0])
  o[0] = %3
}"
        );
        for bits in 0..8u64 {
            assert_eq!(
                pruned.evaluate_u64(&[bits >> 2, (bits >> 1) & 1, bits & 1]).unwrap(),
                circuit.evaluate_u64(&[bits >> 2, (bits >> 1) & 1, bits & 1]).unwrap()
            );
        }
    }
}
