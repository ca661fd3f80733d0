// SPDX-License-Identifier: Apache-2.0

use crate::gate::{GateOp, GateRef};

/// Failures reported by the circuit backend (the `GateBuilder` and the
/// evaluator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// The builder was configured with a gate budget and allocating one more
    /// gate would exceed it.
    GateLimitExceeded { limit: usize },
    /// An operand does not name a gate that already exists in the graph.
    InvalidOperand { operand: GateRef, gate_count: usize },
    ArityMismatch {
        op: GateOp,
        expected: usize,
        got: usize,
    },
    InputCountMismatch { expected: usize, got: usize },
    InputWidthMismatch {
        port: String,
        expected: usize,
        got: usize,
    },
    /// A port was registered with a bit count that disagrees with its shape.
    PortWidthMismatch {
        port: String,
        expected: usize,
        got: usize,
    },
}

impl std::fmt::Display for CircuitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitError::GateLimitExceeded { limit } => {
                write!(f, "gate limit exceeded; limit: {}", limit)
            }
            CircuitError::InvalidOperand {
                operand,
                gate_count,
            } => write!(
                f,
                "operand %{} does not refer to an existing gate (gate count: {})",
                operand.id, gate_count
            ),
            CircuitError::ArityMismatch { op, expected, got } => write!(
                f,
                "{} takes {} operand(s), got {}",
                op.mnemonic(),
                expected,
                got
            ),
            CircuitError::InputCountMismatch { expected, got } => {
                write!(f, "expected {} input(s), got {}", expected, got)
            }
            CircuitError::InputWidthMismatch {
                port,
                expected,
                got,
            } => write!(
                f,
                "input `{}` expects {} bit(s), got {}",
                port, expected, got
            ),
            CircuitError::PortWidthMismatch {
                port,
                expected,
                got,
            } => write!(
                f,
                "port `{}` is declared with {} bit(s) but {} were supplied",
                port, expected, got
            ),
        }
    }
}

impl std::error::Error for CircuitError {}

/// Failures raised while tracing a function into a circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracingError {
    /// Declared shape disagrees with what the traced function consumed or
    /// returned, or two vectors of different widths were combined.
    ShapeMismatch(String),
    /// A host boolean was requested from a bit that is backed by a live gate.
    IllegalConcreteRead { gate: GateRef },
    /// A host literal that is not a valid bit in the position it was used.
    InvalidLiteral(String),
    /// An operation was requested that has no decomposition into the gate
    /// vocabulary for the given operands.
    UnsupportedOperator(String),
    /// The trace already saw an illegal concrete read and cannot be used.
    Poisoned { gate: GateRef },
    Backend(CircuitError),
}

impl std::fmt::Display for TracingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TracingError::ShapeMismatch(msg) => write!(f, "shape mismatch: {}", msg),
            TracingError::IllegalConcreteRead { gate } => write!(
                f,
                "cannot read a concrete value from a bit backed by gate %{}",
                gate.id
            ),
            TracingError::InvalidLiteral(msg) => write!(f, "invalid literal: {}", msg),
            TracingError::UnsupportedOperator(msg) => {
                write!(f, "unsupported operator: {}", msg)
            }
            TracingError::Poisoned { gate } => write!(
                f,
                "trace is unusable after an illegal concrete read of gate %{}",
                gate.id
            ),
            TracingError::Backend(e) => write!(f, "circuit backend error: {}", e),
        }
    }
}

impl std::error::Error for TracingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TracingError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CircuitError> for TracingError {
    fn from(e: CircuitError) -> Self {
        TracingError::Backend(e)
    }
}
