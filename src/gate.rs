// SPDX-License-Identifier: Apache-2.0

//! The circuit graph: gate references, the gate vocabulary, and the
//! `Circuit` that a trace produces.

use serde::{Deserialize, Serialize};

use crate::error::CircuitError;
use crate::gate_sim;

/// Opaque identity of a node in a `Circuit`. Ids are assigned in creation
/// order, so every gate's operands have smaller ids than the gate itself.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GateRef {
    pub id: usize,
}

/// Primitive logical operations a gate can perform.
///
/// `Imp`/`If` and `Nimp`/`Nif` are mirror images of each other; the builder
/// stores only `Imp` and `Nimp` (with operands swapped as needed) so that
/// mirrored requests deduplicate.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum GateOp {
    Not,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    /// `!a | b`
    Imp,
    /// `a & !b`
    Nimp,
    /// `a | !b`
    If,
    /// `!a & b`
    Nif,
}

impl GateOp {
    pub const BINARY: [GateOp; 10] = [
        GateOp::And,
        GateOp::Or,
        GateOp::Xor,
        GateOp::Nand,
        GateOp::Nor,
        GateOp::Xnor,
        GateOp::Imp,
        GateOp::Nimp,
        GateOp::If,
        GateOp::Nif,
    ];

    pub fn arity(self) -> usize {
        match self {
            GateOp::Not => 1,
            _ => 2,
        }
    }

    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            GateOp::And | GateOp::Or | GateOp::Xor | GateOp::Nand | GateOp::Nor | GateOp::Xnor
        )
    }

    /// Returns the op this one is stored as, and whether the two operands
    /// have to be swapped to get there.
    pub fn canonical(self) -> (GateOp, bool) {
        match self {
            GateOp::If => (GateOp::Imp, true),
            GateOp::Nif => (GateOp::Nimp, true),
            op => (op, false),
        }
    }

    /// Evaluates the operation on host booleans. `operands` must have
    /// `self.arity()` elements.
    pub fn eval(self, operands: &[bool]) -> bool {
        debug_assert_eq!(operands.len(), self.arity(), "{:?}", self);
        if let GateOp::Not = self {
            return !operands[0];
        }
        let (a, b) = (operands[0], operands[1]);
        match self {
            GateOp::Not => unreachable!(),
            GateOp::And => a & b,
            GateOp::Or => a | b,
            GateOp::Xor => a ^ b,
            GateOp::Nand => !(a & b),
            GateOp::Nor => !(a | b),
            GateOp::Xnor => !(a ^ b),
            GateOp::Imp => !a | b,
            GateOp::Nimp => a & !b,
            GateOp::If => a | !b,
            GateOp::Nif => !a & b,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            GateOp::Not => "not",
            GateOp::And => "and",
            GateOp::Or => "or",
            GateOp::Xor => "xor",
            GateOp::Nand => "nand",
            GateOp::Nor => "nor",
            GateOp::Xnor => "xnor",
            GateOp::Imp => "imp",
            GateOp::Nimp => "nimp",
            GateOp::If => "if",
            GateOp::Nif => "nif",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gate {
    Constant(bool),
    Input {
        name: String,
        /// Position within the named input; 0 is the most significant bit.
        index: usize,
    },
    Op {
        op: GateOp,
        operands: Vec<GateRef>,
    },
}

impl Gate {
    pub fn get_operands(&self) -> &[GateRef] {
        match self {
            Gate::Op { operands, .. } => operands,
            Gate::Constant(_) | Gate::Input { .. } => &[],
        }
    }

    pub fn is_op(&self) -> bool {
        matches!(self, Gate::Op { .. })
    }
}

/// Declared shape of a function parameter or result.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Bit,
    Bits(usize),
}

impl Shape {
    pub fn bit_count(self) -> usize {
        match self {
            Shape::Bit => 1,
            Shape::Bits(n) => n,
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Bit => write!(f, "bit"),
            Shape::Bits(n) => write!(f, "bits[{}]", n),
        }
    }
}

/// A named bundle of gates that forms one primary input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub shape: Shape,
    /// Index 0 is the most significant bit.
    pub gates: Vec<GateRef>,
}

impl Port {
    pub fn get_bit_count(&self) -> usize {
        self.gates.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    pub name: String,
    pub gates: Vec<Gate>,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl Circuit {
    pub fn get(&self, gate_ref: GateRef) -> &Gate {
        &self.gates[gate_ref.id]
    }

    /// Number of operation gates, i.e. excluding inputs and constants.
    pub fn gate_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_op()).count()
    }

    /// Number of nodes of every kind.
    pub fn node_count(&self) -> usize {
        self.gates.len()
    }

    pub fn input_bit_count(&self) -> usize {
        self.inputs.iter().map(Port::get_bit_count).sum()
    }

    pub fn output_bit_count(&self) -> usize {
        self.outputs.iter().map(Port::get_bit_count).sum()
    }

    /// Evaluates the circuit on one bit vector per input port and returns one
    /// bit vector per output port.
    pub fn evaluate(&self, inputs: &[Vec<bool>]) -> Result<Vec<Vec<bool>>, CircuitError> {
        let result = gate_sim::eval(self, inputs, gate_sim::Collect::None)?;
        Ok(result.outputs)
    }

    /// Like `evaluate` but with every port given as an unsigned integer.
    /// Ports must be at most 64 bits wide.
    pub fn evaluate_u64(&self, inputs: &[u64]) -> Result<Vec<u64>, CircuitError> {
        if inputs.len() != self.inputs.len() {
            return Err(CircuitError::InputCountMismatch {
                expected: self.inputs.len(),
                got: inputs.len(),
            });
        }
        let bit_inputs: Vec<Vec<bool>> = self
            .inputs
            .iter()
            .zip(inputs)
            .map(|(port, value)| u64_to_msb_first(*value, port.get_bit_count()))
            .collect();
        let outputs = self.evaluate(&bit_inputs)?;
        Ok(outputs.iter().map(|bits| msb_first_to_u64(bits)).collect())
    }

    pub fn get_signature(&self) -> String {
        let params = self
            .inputs
            .iter()
            .map(|p| format!("{}: {}", p.name, p.shape))
            .collect::<Vec<String>>()
            .join(", ");
        let results = self
            .outputs
            .iter()
            .map(|p| format!("{}: {}", p.name, p.shape))
            .collect::<Vec<String>>()
            .join(", ");
        format!("fn {}({}) -> ({})", self.name, params, results)
    }

    /// Checks that every op has its arity's worth of operands, that every
    /// operand refers to an earlier gate, and that every port refers to an
    /// existing gate.
    pub fn check_invariants(&self) -> Result<(), CircuitError> {
        let gate_count = self.gates.len();
        for (i, gate) in self.gates.iter().enumerate() {
            if let Gate::Op { op, operands } = gate {
                if operands.len() != op.arity() {
                    return Err(CircuitError::ArityMismatch {
                        op: *op,
                        expected: op.arity(),
                        got: operands.len(),
                    });
                }
            }
            for operand in gate.get_operands() {
                if operand.id >= i {
                    return Err(CircuitError::InvalidOperand {
                        operand: *operand,
                        gate_count: i,
                    });
                }
            }
        }
        for port in self.inputs.iter().chain(self.outputs.iter()) {
            if port.get_bit_count() != port.shape.bit_count() {
                return Err(CircuitError::PortWidthMismatch {
                    port: port.name.clone(),
                    expected: port.shape.bit_count(),
                    got: port.get_bit_count(),
                });
            }
            for gate_ref in &port.gates {
                if gate_ref.id >= gate_count {
                    return Err(CircuitError::InvalidOperand {
                        operand: *gate_ref,
                        gate_count,
                    });
                }
            }
        }
        Ok(())
    }

    fn operand_to_string(&self, gate_ref: GateRef) -> String {
        match self.get(gate_ref) {
            Gate::Input { name, index } => format!("{}[{}]", name, index),
            _ => format!("%{}", gate_ref.id),
        }
    }
}

fn port_to_string(port: &Port) -> String {
    let gates = port
        .gates
        .iter()
        .map(|g| format!("%{}", g.id))
        .collect::<Vec<String>>()
        .join(", ");
    format!("{}: {} = [{}]", port.name, port.shape, gates)
}

/// Text form: the signature with port wiring, then every non-input node in
/// creation order, then the output assignments.
impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inputs = self
            .inputs
            .iter()
            .map(port_to_string)
            .collect::<Vec<String>>()
            .join(", ");
        let outputs = self
            .outputs
            .iter()
            .map(port_to_string)
            .collect::<Vec<String>>()
            .join(", ");
        writeln!(f, "fn {}({}) -> ({}) {{", self.name, inputs, outputs)?;
        for (id, gate) in self.gates.iter().enumerate() {
            match gate {
                Gate::Input { .. } => continue,
                Gate::Constant(value) => writeln!(f, "  %{} = literal({})", id, value)?,
                Gate::Op { op, operands } => {
                    let args = operands
                        .iter()
                        .map(|o| self.operand_to_string(*o))
                        .collect::<Vec<String>>()
                        .join(", ");
                    writeln!(f, "  %{} = {}({})", id, op.mnemonic(), args)?;
                }
            }
        }
        for output in &self.outputs {
            for (i, gate_ref) in output.gates.iter().enumerate() {
                writeln!(
                    f,
                    "  {}[{}] = {}",
                    output.name,
                    i,
                    self.operand_to_string(*gate_ref)
                )?;
            }
        }
        write!(f, "}}")
    }
}

/// Converts `value` into `bit_count` booleans, most significant first.
pub fn u64_to_msb_first(value: u64, bit_count: usize) -> Vec<bool> {
    (0..bit_count)
        .map(|i| {
            let shift = bit_count - 1 - i;
            shift < 64 && (value >> shift) & 1 == 1
        })
        .collect()
}

/// Inverse of `u64_to_msb_first`; only the low 64 bits survive.
pub fn msb_first_to_u64(bits: &[bool]) -> u64 {
    bits.iter().fold(0u64, |acc, b| (acc << 1) | u64::from(*b))
}
