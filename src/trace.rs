// SPDX-License-Identifier: Apache-2.0

//! `Trace` is the graph-builder context that symbolic bits are built against.
//!
//! There is no ambient "current circuit": every bit and vector operation
//! takes the `Trace` it extends as an explicit `&mut` argument, so two traces
//! can never observe each other's gates.

use crate::bit::Bit;
use crate::bits::Bits;
use crate::error::TracingError;
use crate::gate::{Circuit, GateOp, GateRef, Shape};
use crate::gate_builder::{GateBuilder, GateBuilderOptions};
use crate::simplify::{self, Rewrite};
use crate::synthesize::Signal;

pub struct Trace {
    builder: GateBuilder,
    /// Set by the first illegal concrete read; the trace refuses further work.
    poisoned: Option<GateRef>,
    folded: usize,
}

impl Trace {
    pub fn new(name: &str) -> Self {
        Self::with_options(name, GateBuilderOptions::default())
    }

    pub fn with_options(name: &str, options: GateBuilderOptions) -> Self {
        Self {
            builder: GateBuilder::new(name.to_string(), options),
            poisoned: None,
            folded: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.builder.name
    }

    pub fn options(&self) -> GateBuilderOptions {
        self.builder.options
    }

    pub fn builder(&self) -> &GateBuilder {
        &self.builder
    }

    /// Number of operation gates in the graph so far.
    pub fn gate_count(&self) -> usize {
        self.builder.gate_count()
    }

    pub fn node_count(&self) -> usize {
        self.builder.node_count()
    }

    pub fn dedup_hits(&self) -> usize {
        self.builder.dedup_hits()
    }

    /// Number of operations resolved on constants without touching the graph.
    pub fn folded(&self) -> usize {
        self.folded
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    fn check_usable(&self) -> Result<(), TracingError> {
        match self.poisoned {
            Some(gate) => Err(TracingError::Poisoned { gate }),
            None => Ok(()),
        }
    }

    pub fn input_bit(&mut self, name: &str) -> Result<Bit, TracingError> {
        self.check_usable()?;
        let gates = self.builder.add_input(name.to_string(), Shape::Bit)?;
        Ok(Bit::Gate(gates[0]))
    }

    pub fn input_bits(&mut self, name: &str, width: usize) -> Result<Bits, TracingError> {
        self.check_usable()?;
        let gates = self.builder.add_input(name.to_string(), Shape::Bits(width))?;
        Ok(Bits::from_bits(gates.into_iter().map(Bit::Gate)))
    }

    /// Allocates fresh input gates for a parameter of the given shape.
    pub fn input(&mut self, name: &str, shape: Shape) -> Result<Signal, TracingError> {
        match shape {
            Shape::Bit => Ok(Signal::Bit(self.input_bit(name)?)),
            Shape::Bits(width) => Ok(Signal::Bits(self.input_bits(name, width)?)),
        }
    }

    /// Registers `signal` as the next output port. Constant bits get constant
    /// gates so that every output refers to a node.
    pub fn output(&mut self, name: &str, shape: Shape, signal: &Signal) -> Result<(), TracingError> {
        self.check_usable()?;
        if signal.shape() != shape {
            return Err(TracingError::ShapeMismatch(format!(
                "output `{}` is declared as {} but the function returned {}",
                name,
                shape,
                signal.shape()
            )));
        }
        let bits: Vec<Bit> = match signal {
            Signal::Bit(bit) => vec![*bit],
            Signal::Bits(bits) => bits.iter().collect(),
        };
        let gates = bits
            .into_iter()
            .map(|bit| self.materialize(bit))
            .collect::<Result<Vec<GateRef>, TracingError>>()?;
        self.builder.add_output(name.to_string(), shape, gates)?;
        Ok(())
    }

    /// Returns the gate backing `bit`, allocating a constant gate for a
    /// concrete bit.
    pub fn materialize(&mut self, bit: Bit) -> Result<GateRef, TracingError> {
        match bit {
            Bit::Gate(gate_ref) => Ok(gate_ref),
            Bit::Const(value) => Ok(self.builder.add_constant(value)?),
        }
    }

    /// Applies a primitive operation. Concrete operands fold to a concrete
    /// result without touching the graph; otherwise the result is backed by a
    /// (possibly pre-existing) gate.
    pub fn apply(&mut self, op: GateOp, operands: &[Bit]) -> Result<Bit, TracingError> {
        self.check_usable()?;
        if operands.len() != op.arity() {
            return Err(TracingError::UnsupportedOperator(format!(
                "{} takes {} operand(s), got {}",
                op.mnemonic(),
                op.arity(),
                operands.len()
            )));
        }
        let values: Option<Vec<bool>> = operands.iter().map(Bit::value).collect();
        if let Some(values) = values {
            self.folded += 1;
            return Ok(Bit::Const(op.eval(&values)));
        }
        if self.builder.options.simplify {
            if let Some(rewrite) = simplify::operand_simplify(op, operands, &self.builder) {
                return match rewrite {
                    Rewrite::Const(value) => Ok(Bit::Const(value)),
                    Rewrite::Same(gate_ref) => Ok(Bit::Gate(gate_ref)),
                    Rewrite::Not(gate_ref) => self.apply(GateOp::Not, &[Bit::Gate(gate_ref)]),
                };
            }
        }
        let gate_refs = operands
            .iter()
            .map(|bit| self.materialize(*bit))
            .collect::<Result<Vec<GateRef>, TracingError>>()?;
        Ok(Bit::Gate(self.builder.add_gate(op, &gate_refs)?))
    }

    /// Reads the host value of `bit`. Reading a gate-backed bit is a usage
    /// error that also leaves this trace unusable.
    pub fn read(&mut self, bit: Bit) -> Result<bool, TracingError> {
        self.check_usable()?;
        match bit {
            Bit::Const(value) => Ok(value),
            Bit::Gate(gate) => {
                log::debug!("trace `{}` poisoned by a read of %{}", self.name(), gate.id);
                self.poisoned = Some(gate);
                Err(TracingError::IllegalConcreteRead { gate })
            }
        }
    }

    /// Finishes the trace and hands back the graph.
    pub fn finish(self) -> Result<Circuit, TracingError> {
        self.check_usable()?;
        log::debug!(
            "trace `{}` finished; gates: {} nodes: {} dedup hits: {} folded: {}",
            self.builder.name,
            self.builder.gate_count(),
            self.builder.node_count(),
            self.builder.dedup_hits(),
            self.folded
        );
        Ok(self.builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CircuitError;

    #[test]
    fn test_concrete_operands_fold_without_gates() {
        let mut cx = Trace::new("fold");
        for op in GateOp::BINARY {
            for a in [false, true] {
                for b in [false, true] {
                    let got = cx.apply(op, &[Bit::Const(a), Bit::Const(b)]).unwrap();
                    assert_eq!(got, Bit::Const(op.eval(&[a, b])));
                }
            }
        }
        assert_eq!(cx.apply(GateOp::Not, &[Bit::Const(true)]).unwrap(), Bit::Const(false));
        assert_eq!(cx.node_count(), 0);
        assert_eq!(cx.folded(), 41);
    }

    #[test]
    fn test_strict_mode_allocates_constant_gates() {
        let mut cx = Trace::new("strict");
        let x = cx.input_bit("x").unwrap();
        let y = cx.apply(GateOp::And, &[x, Bit::Const(true)]).unwrap();
        let z = cx.apply(GateOp::Or, &[Bit::Const(true), x]).unwrap();
        assert!(y.gate().is_some());
        assert!(z.gate().is_some());
        // One input, one shared constant, two gates.
        assert_eq!(cx.node_count(), 4);
        assert_eq!(cx.gate_count(), 2);
    }

    #[test]
    fn test_simplify_mode_avoids_gates() {
        let mut cx = Trace::with_options("opt", GateBuilderOptions::opt());
        let x = cx.input_bit("x").unwrap();
        assert_eq!(cx.apply(GateOp::And, &[x, Bit::Const(true)]).unwrap(), x);
        assert_eq!(cx.apply(GateOp::Xor, &[x, x]).unwrap(), Bit::Const(false));
        let not_x = cx.apply(GateOp::Xor, &[x, Bit::Const(true)]).unwrap();
        assert_eq!(not_x, cx.apply(GateOp::Not, &[x]).unwrap());
        assert_eq!(cx.apply(GateOp::Not, &[not_x]).unwrap(), x);
        assert_eq!(cx.gate_count(), 1);
    }

    #[test]
    fn test_wrong_arity_is_unsupported() {
        let mut cx = Trace::new("arity");
        let x = cx.input_bit("x").unwrap();
        assert!(matches!(
            cx.apply(GateOp::And, &[x]),
            Err(TracingError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn test_read_poisons_trace() {
        let mut cx = Trace::new("poison");
        let x = cx.input_bit("x").unwrap();
        assert_eq!(cx.read(Bit::Const(true)), Ok(true));
        let gate = x.gate().unwrap();
        assert_eq!(cx.read(x), Err(TracingError::IllegalConcreteRead { gate }));
        assert!(cx.is_poisoned());
        assert_eq!(cx.apply(GateOp::Not, &[x]), Err(TracingError::Poisoned { gate }));
        assert!(matches!(cx.finish(), Err(TracingError::Poisoned { .. })));
    }

    #[test]
    fn test_backend_failure_propagates() {
        let mut cx = Trace::with_options("limited", GateBuilderOptions::strict().with_max_gates(2));
        let x = cx.input_bit("x").unwrap();
        let y = cx.input_bit("y").unwrap();
        assert_eq!(
            cx.apply(GateOp::And, &[x, y]),
            Err(TracingError::Backend(CircuitError::GateLimitExceeded { limit: 2 }))
        );
    }

    #[test]
    fn test_output_shape_checked() {
        let mut cx = Trace::new("out");
        let xs = cx.input_bits("xs", 3).unwrap();
        assert!(matches!(
            cx.output("o", Shape::Bits(2), &Signal::Bits(xs.clone())),
            Err(TracingError::ShapeMismatch(_))
        ));
        cx.output("o", Shape::Bits(3), &Signal::Bits(xs)).unwrap();
        cx.output("k", Shape::Bit, &Signal::Bit(Bit::Const(true))).unwrap();
        let circuit = cx.finish().unwrap();
        assert_eq!(circuit.evaluate_u64(&[0b101]).unwrap(), vec![0b101, 1]);
    }
}
