// SPDX-License-Identifier: Apache-2.0

//! The `GateBuilder` is the circuit backend. It owns the graph while it is
//! being constructed and offers the handful of operations tracing needs:
//! allocate a constant, allocate a gate, register inputs and outputs.
//!
//! Every allocation goes through structural hashing, so asking for the same
//! operation over the same operands (in either order, for commutative
//! operations) returns the gate that already exists.
//!
//! Basic example usage:
//! ```
//! use circuitry::gate::{GateOp, Shape};
//! use circuitry::gate_builder::{GateBuilder, GateBuilderOptions};
//!
//! let mut builder = GateBuilder::new("my_and_gate".to_string(), GateBuilderOptions::strict());
//! let a = builder.add_input("a".to_string(), Shape::Bit).unwrap();
//! let b = builder.add_input("b".to_string(), Shape::Bit).unwrap();
//! let o = builder.add_gate(GateOp::And, &[a[0], b[0]]).unwrap();
//! builder.add_output("o".to_string(), Shape::Bit, vec![o]).unwrap();
//! let circuit = builder.build();
//! assert_eq!(circuit.gate_count(), 1);
//! ```

use crate::error::CircuitError;
use crate::gate::{Circuit, Gate, GateOp, GateRef, Port, Shape};
use crate::gate_hasher::{GateHasher, GateKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateBuilderOptions {
    /// Whether to simplify operations that have some (but not all) constant
    /// operands, or repeated operands, instead of allocating a gate for them.
    pub simplify: bool,
    /// Upper bound on the number of nodes the graph may hold.
    pub max_gates: Option<usize>,
}

impl GateBuilderOptions {
    /// Folds only operations whose operands are all constant; everything else
    /// becomes a gate.
    pub fn strict() -> Self {
        Self {
            simplify: false,
            max_gates: None,
        }
    }

    /// Returns an "optimizing" `GateBuilderOptions` with local simplification
    /// enabled.
    pub fn opt() -> Self {
        Self {
            simplify: true,
            max_gates: None,
        }
    }

    pub fn with_max_gates(self, max_gates: usize) -> Self {
        Self {
            max_gates: Some(max_gates),
            ..self
        }
    }
}

impl Default for GateBuilderOptions {
    fn default() -> Self {
        Self::strict()
    }
}

pub struct GateBuilder {
    pub name: String,
    pub gates: Vec<Gate>,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub options: GateBuilderOptions,
    hasher: GateHasher,
    op_count: usize,
}

impl GateBuilder {
    pub fn new(name: String, options: GateBuilderOptions) -> Self {
        Self {
            name,
            gates: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            options,
            hasher: GateHasher::new(),
            op_count: 0,
        }
    }

    pub fn build(self) -> Circuit {
        let circuit = Circuit {
            name: self.name,
            gates: self.gates,
            inputs: self.inputs,
            outputs: self.outputs,
        };
        debug_assert!(
            circuit.check_invariants().is_ok(),
            "GateBuilder::build: {:?}",
            circuit.check_invariants()
        );
        circuit
    }

    pub fn get(&self, gate_ref: GateRef) -> &Gate {
        &self.gates[gate_ref.id]
    }

    /// Number of operation gates allocated so far.
    pub fn gate_count(&self) -> usize {
        self.op_count
    }

    pub fn node_count(&self) -> usize {
        self.gates.len()
    }

    /// Number of allocation requests answered with an existing gate.
    pub fn dedup_hits(&self) -> usize {
        self.hasher.hits()
    }

    pub fn is_valid_ref(&self, gate_ref: GateRef) -> bool {
        gate_ref.id < self.gates.len()
    }

    fn validate_ref(&self, gate_ref: GateRef) -> Result<(), CircuitError> {
        if self.is_valid_ref(gate_ref) {
            Ok(())
        } else {
            Err(CircuitError::InvalidOperand {
                operand: gate_ref,
                gate_count: self.gates.len(),
            })
        }
    }

    fn push(&mut self, gate: Gate) -> Result<GateRef, CircuitError> {
        if let Some(limit) = self.options.max_gates {
            if self.gates.len() >= limit {
                return Err(CircuitError::GateLimitExceeded { limit });
            }
        }
        let gate_ref = GateRef {
            id: self.gates.len(),
        };
        if gate.is_op() {
            self.op_count += 1;
        }
        self.gates.push(gate);
        Ok(gate_ref)
    }

    /// Returns the constant node for `value`, allocating it on first use.
    pub fn add_constant(&mut self, value: bool) -> Result<GateRef, CircuitError> {
        let key = GateKey::constant(value);
        if let Some(existing) = self.hasher.lookup(&key) {
            return Ok(existing);
        }
        let gate_ref = self.push(Gate::Constant(value))?;
        self.hasher.record(key, gate_ref);
        Ok(gate_ref)
    }

    /// Allocates one fresh input node per bit of `shape` and records them as
    /// the next input port. Inputs are never deduplicated.
    pub fn add_input(&mut self, name: String, shape: Shape) -> Result<Vec<GateRef>, CircuitError> {
        let mut gates = Vec::with_capacity(shape.bit_count());
        for index in 0..shape.bit_count() {
            gates.push(self.push(Gate::Input {
                name: name.clone(),
                index,
            })?);
        }
        self.inputs.push(Port {
            name,
            shape,
            gates: gates.clone(),
        });
        Ok(gates)
    }

    /// Returns a gate computing `op` over `operands`, reusing a structurally
    /// identical gate if one exists.
    pub fn add_gate(&mut self, op: GateOp, operands: &[GateRef]) -> Result<GateRef, CircuitError> {
        if operands.len() != op.arity() {
            return Err(CircuitError::ArityMismatch {
                op,
                expected: op.arity(),
                got: operands.len(),
            });
        }
        for operand in operands {
            self.validate_ref(*operand)?;
        }
        let key = GateKey::op(op, operands);
        if let Some(existing) = self.hasher.lookup(&key) {
            log::trace!("dedup {}{:?} => %{}", op.mnemonic(), operands, existing.id);
            return Ok(existing);
        }
        let gate = match &key {
            GateKey::Op { op, operands } => Gate::Op {
                op: *op,
                operands: operands.clone(),
            },
            GateKey::Constant(_) => unreachable!("GateKey::op always yields an op key"),
        };
        let gate_ref = self.push(gate)?;
        log::trace!("alloc %{} = {}{:?}", gate_ref.id, op.mnemonic(), operands);
        self.hasher.record(key, gate_ref);
        Ok(gate_ref)
    }

    /// Records `gates` as the next output port.
    pub fn add_output(
        &mut self,
        name: String,
        shape: Shape,
        gates: Vec<GateRef>,
    ) -> Result<(), CircuitError> {
        if gates.len() != shape.bit_count() {
            return Err(CircuitError::PortWidthMismatch {
                port: name,
                expected: shape.bit_count(),
                got: gates.len(),
            });
        }
        for gate_ref in &gates {
            self.validate_ref(*gate_ref)?;
        }
        self.outputs.push(Port { name, shape, gates });
        Ok(())
    }
}
