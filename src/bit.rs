// SPDX-License-Identifier: Apache-2.0

//! Symbolic bits.
//!
//! A `Bit` is either a concrete boolean or a reference to a gate in the graph
//! owned by a `Trace`. Operations never mutate a bit: each one returns a new
//! bit, folded on the host when every operand is concrete and backed by a
//! (possibly shared) gate otherwise.
//!
//! Traced code must not branch on the value of a gate-backed bit. Every read
//! goes through the trace (`Bit::to_bool`, `Trace::read`): reading a
//! gate-backed bit fails with `TracingError::IllegalConcreteRead` and leaves
//! the trace unusable. `Bit::value` peeks without reading.

use crate::error::TracingError;
use crate::gate::{GateOp, GateRef};
use crate::trace::Trace;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Bit {
    Const(bool),
    Gate(GateRef),
}

/// Anything that can stand in for a bit operand: another bit, a host
/// boolean, or an integer literal that is 0 or 1.
pub trait BitOperand {
    fn to_bit(&self) -> Result<Bit, TracingError>;
}

impl BitOperand for Bit {
    fn to_bit(&self) -> Result<Bit, TracingError> {
        Ok(*self)
    }
}

impl BitOperand for bool {
    fn to_bit(&self) -> Result<Bit, TracingError> {
        Ok(Bit::Const(*self))
    }
}

impl<T: BitOperand + ?Sized> BitOperand for &T {
    fn to_bit(&self) -> Result<Bit, TracingError> {
        (**self).to_bit()
    }
}

macro_rules! impl_bit_operand_for_int {
    ($($t:ty),*) => {
        $(
            impl BitOperand for $t {
                fn to_bit(&self) -> Result<Bit, TracingError> {
                    match *self {
                        0 => Ok(Bit::ZERO),
                        1 => Ok(Bit::ONE),
                        other => Err(TracingError::InvalidLiteral(format!(
                            "{} is not a bit; expected 0 or 1",
                            other
                        ))),
                    }
                }
            }
        )*
    };
}

impl_bit_operand_for_int!(u8, u32, u64, usize, i32);

impl Bit {
    pub const ZERO: Bit = Bit::Const(false);
    pub const ONE: Bit = Bit::Const(true);

    pub fn constant(value: bool) -> Self {
        Bit::Const(value)
    }

    /// The concrete value, if this bit has one.
    pub fn value(&self) -> Option<bool> {
        match self {
            Bit::Const(value) => Some(*value),
            Bit::Gate(_) => None,
        }
    }

    pub fn gate(&self) -> Option<GateRef> {
        match self {
            Bit::Const(_) => None,
            Bit::Gate(gate_ref) => Some(*gate_ref),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Bit::Const(_))
    }

    /// Reads the host value of this bit through `cx`; see `Trace::read`.
    pub fn to_bool(self, cx: &mut Trace) -> Result<bool, TracingError> {
        cx.read(self)
    }

    fn binary(self, cx: &mut Trace, op: GateOp, other: impl BitOperand) -> Result<Bit, TracingError> {
        let other = other.to_bit()?;
        cx.apply(op, &[self, other])
    }

    pub fn not(self, cx: &mut Trace) -> Result<Bit, TracingError> {
        cx.apply(GateOp::Not, &[self])
    }

    pub fn and(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::And, other)
    }

    pub fn or(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Or, other)
    }

    pub fn xor(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Xor, other)
    }

    pub fn nand(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Nand, other)
    }

    pub fn nor(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Nor, other)
    }

    pub fn xnor(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Xnor, other)
    }

    /// `!self | other`
    pub fn imp(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Imp, other)
    }

    /// `self & !other`
    pub fn nimp(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Nimp, other)
    }

    /// `self | !other`
    pub fn if_(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::If, other)
    }

    /// `!self & other`
    pub fn nif(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.binary(cx, GateOp::Nif, other)
    }

    // Comparisons treat a bit as the unsigned integer 0 or 1.

    pub fn eq(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.xnor(cx, other)
    }

    pub fn ne(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.xor(cx, other)
    }

    pub fn lt(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.nif(cx, other)
    }

    pub fn gt(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.nimp(cx, other)
    }

    pub fn le(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.imp(cx, other)
    }

    pub fn ge(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.if_(cx, other)
    }

    /// `self - other` modulo 2.
    pub fn sub(self, cx: &mut Trace, other: impl BitOperand) -> Result<Bit, TracingError> {
        self.xor(cx, other)
    }

    /// `minuend - self`, where the minuend is a host integer. `1 - x` is the
    /// usual spelling of negation in traced code.
    pub fn rsub(self, cx: &mut Trace, minuend: i64) -> Result<Bit, TracingError> {
        match minuend {
            1 => self.not(cx),
            0 => Ok(self),
            other => Err(TracingError::InvalidLiteral(format!(
                "can only subtract a bit from the integer 1 (or 0), got {}",
                other
            ))),
        }
    }

    /// `self ? on_true : on_false`
    pub fn mux(
        self,
        cx: &mut Trace,
        on_true: impl BitOperand,
        on_false: impl BitOperand,
    ) -> Result<Bit, TracingError> {
        let picked_true = self.and(cx, on_true)?;
        let picked_false = self.nif(cx, on_false)?;
        picked_true.or(cx, picked_false)
    }

    /// Returns `(sum, carry)`.
    pub fn half_adder(self, cx: &mut Trace, other: impl BitOperand) -> Result<(Bit, Bit), TracingError> {
        let other = other.to_bit()?;
        let sum = self.xor(cx, other)?;
        let carry = self.and(cx, other)?;
        Ok((sum, carry))
    }

    /// Returns `(sum, carry_out)`.
    pub fn full_adder(
        self,
        cx: &mut Trace,
        other: impl BitOperand,
        carry_in: impl BitOperand,
    ) -> Result<(Bit, Bit), TracingError> {
        let other = other.to_bit()?;
        let carry_in = carry_in.to_bit()?;
        let partial = self.xor(cx, other)?;
        let sum = partial.xor(cx, carry_in)?;
        let generate = self.and(cx, other)?;
        let propagate = partial.and(cx, carry_in)?;
        let carry = generate.or(cx, propagate)?;
        Ok((sum, carry))
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        Bit::Const(value)
    }
}

impl std::fmt::Display for Bit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bit::Const(value) => write!(f, "{}", u8::from(*value)),
            Bit::Gate(gate_ref) => write!(f, "%{}", gate_ref.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{Circuit, Shape};
    use crate::synthesize::Signal;
    use test_case::test_case;

    fn trace_binary(
        name: &str,
        f: impl Fn(&mut Trace, Bit, Bit) -> Result<Bit, TracingError>,
    ) -> Circuit {
        let mut cx = Trace::new(name);
        let x = cx.input_bit("x").unwrap();
        let y = cx.input_bit("y").unwrap();
        let o = f(&mut cx, x, y).unwrap();
        cx.output("o", Shape::Bit, &Signal::Bit(o)).unwrap();
        cx.finish().unwrap()
    }

    #[test]
    fn test_equal_sample_expression() {
        let circuit = trace_binary("equal", |cx, x, y| {
            let both = x.and(cx, y)?;
            let not_x = x.rsub(cx, 1)?;
            let not_y = y.rsub(cx, 1)?;
            let neither = not_x.and(cx, not_y)?;
            both.or(cx, neither)
        });
        assert_eq!(circuit.evaluate_u64(&[0, 1]).unwrap(), vec![0]);
        assert_eq!(circuit.evaluate_u64(&[1, 1]).unwrap(), vec![1]);
        assert_eq!(circuit.evaluate_u64(&[0, 0]).unwrap(), vec![1]);
        assert_eq!(circuit.evaluate_u64(&[1, 0]).unwrap(), vec![0]);
        assert_eq!(circuit.gate_count(), 5);
    }

    #[test_case(0, 0, 0; "zero_zero")]
    #[test_case(0, 1, 1; "zero_one")]
    #[test_case(1, 0, 1; "one_zero")]
    #[test_case(1, 1, 0; "one_one")]
    fn test_literal_operands_fold(a: u8, b: u8, want: u8) {
        let mut cx = Trace::new("fold");
        let a = a.to_bit().unwrap();
        assert_eq!(a.xor(&mut cx, b).unwrap(), want.to_bit().unwrap());
        assert_eq!(cx.node_count(), 0);
    }

    #[test]
    fn test_invalid_literals() {
        let mut cx = Trace::new("literals");
        let x = cx.input_bit("x").unwrap();
        assert!(matches!(x.and(&mut cx, 2u8), Err(TracingError::InvalidLiteral(_))));
        assert!(matches!(x.or(&mut cx, -1i32), Err(TracingError::InvalidLiteral(_))));
        assert!(matches!(x.rsub(&mut cx, 2), Err(TracingError::InvalidLiteral(_))));
        assert_eq!(x.rsub(&mut cx, 0).unwrap(), x);
        assert_eq!(cx.gate_count(), 0);
    }

    #[test]
    fn test_repeated_operation_shares_gate() {
        let mut cx = Trace::new("dedupe");
        let a = cx.input_bit("a").unwrap();
        let b = cx.input_bit("b").unwrap();
        let first = a.and(&mut cx, a).unwrap();
        let second = a.and(&mut cx, a).unwrap();
        assert_eq!(first, second);
        assert_eq!(a.and(&mut cx, b).unwrap(), b.and(&mut cx, &a).unwrap());
        assert_eq!(cx.gate_count(), 2);
    }

    #[test]
    fn test_mux_truth_table() {
        let mut cx = Trace::new("mux");
        let s = cx.input_bit("s").unwrap();
        let t = cx.input_bit("t").unwrap();
        let f = cx.input_bit("f").unwrap();
        let o = s.mux(&mut cx, t, f).unwrap();
        cx.output("o", Shape::Bit, &Signal::Bit(o)).unwrap();
        let circuit = cx.finish().unwrap();
        for bits in 0..8u64 {
            let (s, t, f) = ((bits >> 2) & 1, (bits >> 1) & 1, bits & 1);
            let want = if s == 1 { t } else { f };
            assert_eq!(circuit.evaluate_u64(&[s, t, f]).unwrap(), vec![want]);
        }
    }

    #[test]
    fn test_full_adder_truth_table() {
        let mut cx = Trace::new("full_adder");
        let a = cx.input_bit("a").unwrap();
        let b = cx.input_bit("b").unwrap();
        let c = cx.input_bit("c").unwrap();
        let (sum, carry) = a.full_adder(&mut cx, b, c).unwrap();
        cx.output("sum", Shape::Bit, &Signal::Bit(sum)).unwrap();
        cx.output("carry", Shape::Bit, &Signal::Bit(carry)).unwrap();
        let circuit = cx.finish().unwrap();
        for bits in 0..8u64 {
            let (a, b, c) = ((bits >> 2) & 1, (bits >> 1) & 1, bits & 1);
            let total = a + b + c;
            assert_eq!(
                circuit.evaluate_u64(&[a, b, c]).unwrap(),
                vec![total & 1, total >> 1]
            );
        }
    }

    #[test]
    fn test_comparisons_on_constants() {
        let mut cx = Trace::new("cmp");
        for a in [false, true] {
            for b in [false, true] {
                let x = Bit::from(a);
                assert_eq!(x.eq(&mut cx, b).unwrap().value(), Some(a == b));
                assert_eq!(x.ne(&mut cx, b).unwrap().value(), Some(a != b));
                assert_eq!(x.lt(&mut cx, b).unwrap().value(), Some(a < b));
                assert_eq!(x.gt(&mut cx, b).unwrap().value(), Some(a > b));
                assert_eq!(x.le(&mut cx, b).unwrap().value(), Some(a <= b));
                assert_eq!(x.ge(&mut cx, b).unwrap().value(), Some(a >= b));
            }
        }
        assert_eq!(cx.node_count(), 0);
    }

    #[test]
    fn test_concrete_conversion() {
        let mut cx = Trace::new("read");
        assert_eq!(Bit::ONE.to_bool(&mut cx), Ok(true));
        let x = cx.input_bit("x").unwrap();
        let gate = x.gate().unwrap();
        assert_eq!(x.value(), None);
        assert!(!cx.is_poisoned());
        assert_eq!(
            x.to_bool(&mut cx),
            Err(TracingError::IllegalConcreteRead { gate })
        );
        assert!(cx.is_poisoned());
        assert_eq!(
            Bit::ONE.to_bool(&mut cx),
            Err(TracingError::Poisoned { gate })
        );
        let gate = GateRef { id: 3 };
        assert_eq!(Bit::Gate(gate).to_string(), "%3");
        assert_eq!(Bit::ZERO.to_string(), "0");
    }
}
