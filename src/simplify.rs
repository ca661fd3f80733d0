// SPDX-License-Identifier: Apache-2.0

//! Local rewrites applied before allocating a gate when the builder runs with
//! `GateBuilderOptions::simplify` set.
//!
//! Every binary operation with one constant operand, two identical operands,
//! or an operand and its negation is really a function of a single bit `x`,
//! and any such function is one of `0`, `1`, `x`, or `!x`. We find out which
//! by evaluating the operation at `x = 0` and `x = 1`.

use crate::bit::Bit;
use crate::gate::{Gate, GateOp, GateRef};
use crate::gate_builder::GateBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    Const(bool),
    Same(GateRef),
    Not(GateRef),
}

fn classify(at_zero: bool, at_one: bool, x: GateRef) -> Rewrite {
    match (at_zero, at_one) {
        (false, false) => Rewrite::Const(false),
        (true, true) => Rewrite::Const(true),
        (false, true) => Rewrite::Same(x),
        (true, false) => Rewrite::Not(x),
    }
}

// If `gate_ref` is a negation, returns what it negates.
fn negated_operand(gate_ref: GateRef, builder: &GateBuilder) -> Option<GateRef> {
    match builder.get(gate_ref) {
        Gate::Op {
            op: GateOp::Not,
            operands,
        } => Some(operands[0]),
        _ => None,
    }
}

/// Returns a cheaper equivalent of `op(operands)` if there is one. Operands
/// that are all constant are not handled here; they fold before this is
/// consulted.
pub fn operand_simplify(op: GateOp, operands: &[Bit], builder: &GateBuilder) -> Option<Rewrite> {
    match (op, operands) {
        (GateOp::Not, [Bit::Gate(x)]) => {
            negated_operand(*x, builder).map(Rewrite::Same)
        }
        (_, [Bit::Const(c), Bit::Gate(x)]) => {
            Some(classify(op.eval(&[*c, false]), op.eval(&[*c, true]), *x))
        }
        (_, [Bit::Gate(x), Bit::Const(c)]) => {
            Some(classify(op.eval(&[false, *c]), op.eval(&[true, *c]), *x))
        }
        (_, [Bit::Gate(a), Bit::Gate(b)]) if a == b => {
            Some(classify(op.eval(&[false, false]), op.eval(&[true, true]), *a))
        }
        (_, [Bit::Gate(a), Bit::Gate(b)]) => {
            if negated_operand(*b, builder) == Some(*a) {
                // op(a, !a)
                Some(classify(op.eval(&[false, true]), op.eval(&[true, false]), *a))
            } else if negated_operand(*a, builder) == Some(*b) {
                // op(!b, b)
                Some(classify(op.eval(&[true, false]), op.eval(&[false, true]), *b))
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Shape;
    use crate::gate_builder::GateBuilderOptions;

    fn setup() -> (GateBuilder, GateRef, GateRef) {
        let mut builder = GateBuilder::new("test".to_string(), GateBuilderOptions::opt());
        let a = builder.add_input("a".to_string(), Shape::Bit).unwrap()[0];
        let b = builder.add_input("b".to_string(), Shape::Bit).unwrap()[0];
        (builder, a, b)
    }

    #[test]
    fn test_one_constant_operand() {
        let (builder, a, _) = setup();
        let x = Bit::Gate(a);
        let zero = Bit::Const(false);
        let one = Bit::Const(true);
        assert_eq!(operand_simplify(GateOp::And, &[x, zero], &builder), Some(Rewrite::Const(false)));
        assert_eq!(operand_simplify(GateOp::And, &[one, x], &builder), Some(Rewrite::Same(a)));
        assert_eq!(operand_simplify(GateOp::Or, &[x, one], &builder), Some(Rewrite::Const(true)));
        assert_eq!(operand_simplify(GateOp::Xor, &[one, x], &builder), Some(Rewrite::Not(a)));
        // imp(x, 0) = !x
        assert_eq!(operand_simplify(GateOp::Imp, &[x, zero], &builder), Some(Rewrite::Not(a)));
        // nimp(0, x) = 0
        assert_eq!(operand_simplify(GateOp::Nimp, &[zero, x], &builder), Some(Rewrite::Const(false)));
    }

    #[test]
    fn test_repeated_operand() {
        let (builder, a, _) = setup();
        let x = Bit::Gate(a);
        assert_eq!(operand_simplify(GateOp::And, &[x, x], &builder), Some(Rewrite::Same(a)));
        assert_eq!(operand_simplify(GateOp::Xor, &[x, x], &builder), Some(Rewrite::Const(false)));
        assert_eq!(operand_simplify(GateOp::Nand, &[x, x], &builder), Some(Rewrite::Not(a)));
        assert_eq!(operand_simplify(GateOp::Imp, &[x, x], &builder), Some(Rewrite::Const(true)));
    }

    #[test]
    fn test_operand_and_its_negation() {
        let (mut builder, a, b) = setup();
        let not_a = builder.add_gate(GateOp::Not, &[a]).unwrap();
        let x = Bit::Gate(a);
        let nx = Bit::Gate(not_a);
        assert_eq!(operand_simplify(GateOp::And, &[x, nx], &builder), Some(Rewrite::Const(false)));
        assert_eq!(operand_simplify(GateOp::Or, &[nx, x], &builder), Some(Rewrite::Const(true)));
        // nimp(!a, a) = !a & !a = !a
        assert_eq!(operand_simplify(GateOp::Nimp, &[nx, x], &builder), Some(Rewrite::Not(a)));
        assert_eq!(operand_simplify(GateOp::Not, &[nx], &builder), Some(Rewrite::Same(a)));
        assert_eq!(operand_simplify(GateOp::And, &[x, Bit::Gate(b)], &builder), None);
    }
}
