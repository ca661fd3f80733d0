// SPDX-License-Identifier: Apache-2.0

//! Evaluates a `Circuit` on concrete inputs.
//!
//! Gates are stored in creation order and every operand precedes its user, so
//! a single forward sweep is a valid topological walk.

use bitvec::vec::BitVec;

use crate::error::CircuitError;
use crate::gate::{Circuit, Gate};

pub struct GateSimResult {
    /// One entry per output port, most significant bit first.
    pub outputs: Vec<Vec<bool>>,
    /// The value of every node, indexed by gate id, when requested.
    pub all_values: Option<BitVec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collect {
    None,
    All,
}

pub fn eval(circuit: &Circuit, inputs: &[Vec<bool>], collect: Collect) -> Result<GateSimResult, CircuitError> {
    // Circuits that did not come from a `GateBuilder` may hold bad refs.
    circuit.check_invariants()?;
    if inputs.len() != circuit.inputs.len() {
        return Err(CircuitError::InputCountMismatch {
            expected: circuit.inputs.len(),
            got: inputs.len(),
        });
    }

    let mut values: BitVec = BitVec::repeat(false, circuit.gates.len());

    // Seed the values with the input bits.
    for (input, port) in inputs.iter().zip(circuit.inputs.iter()) {
        if input.len() != port.get_bit_count() {
            return Err(CircuitError::InputWidthMismatch {
                port: port.name.clone(),
                expected: port.get_bit_count(),
                got: input.len(),
            });
        }
        for (gate_ref, value) in port.gates.iter().zip(input.iter()) {
            values.set(gate_ref.id, *value);
        }
    }

    let mut operand_values: Vec<bool> = Vec::with_capacity(2);
    for (id, gate) in circuit.gates.iter().enumerate() {
        match gate {
            Gate::Input { .. } => continue,
            Gate::Constant(value) => values.set(id, *value),
            Gate::Op { op, operands } => {
                operand_values.clear();
                operand_values.extend(operands.iter().map(|operand| values[operand.id]));
                values.set(id, op.eval(&operand_values));
            }
        }
    }

    let outputs = circuit
        .outputs
        .iter()
        .map(|port| port.gates.iter().map(|g| values[g.id]).collect())
        .collect();
    Ok(GateSimResult {
        outputs,
        all_values: match collect {
            Collect::All => Some(values),
            Collect::None => None,
        },
    })
}
