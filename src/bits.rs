// SPDX-License-Identifier: Apache-2.0

//! Fixed-width vectors of symbolic bits.
//!
//! Index 0 is the most significant bit, matching the order ports are
//! evaluated in. A `Bits` is an immutable view into shared storage, so
//! slicing and splitting never copy gate references.
//!
//! Restructuring operations (slices, concatenation, shifts, rotations) only
//! rearrange bits and never touch the graph. Everything else decomposes into
//! per-bit operations through `Bit`.

use std::sync::Arc;

use crate::bit::{Bit, BitOperand};
use crate::error::TracingError;
use crate::gate::{msb_first_to_u64, u64_to_msb_first, GateOp};
use crate::trace::Trace;

/// Shape of the gate network a reduction builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionKind {
    /// `((b0 op b1) op b2) op ...`: depth grows linearly with the width.
    Linear,
    /// Balanced binary tree: depth grows with log2 of the width.
    Tree,
}

#[derive(Clone)]
pub struct Bits {
    storage: Arc<[Bit]>,
    start: usize,
    len: usize,
}

impl Bits {
    pub fn from_bits(bits: impl IntoIterator<Item = Bit>) -> Self {
        let storage: Arc<[Bit]> = bits.into_iter().collect();
        let len = storage.len();
        Self {
            storage,
            start: 0,
            len,
        }
    }

    pub fn from_bools(values: &[bool]) -> Self {
        Self::from_bits(values.iter().map(|v| Bit::Const(*v)))
    }

    /// Builds a concrete vector from 0/1 literals.
    pub fn constants(values: &[u8]) -> Result<Self, TracingError> {
        let bits = values
            .iter()
            .map(|v| v.to_bit())
            .collect::<Result<Vec<Bit>, TracingError>>()?;
        Ok(Self::from_bits(bits))
    }

    /// The low `width` bits of `value`.
    pub fn from_u64(value: u64, width: usize) -> Self {
        Self::from_bools(&u64_to_msb_first(value, width))
    }

    /// Eight bits per byte, first byte first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_bits(
            bytes
                .iter()
                .flat_map(|byte| (0..8).rev().map(move |i| Bit::Const((byte >> i) & 1 == 1))),
        )
    }

    pub fn zeros(width: usize) -> Self {
        Self::from_bits(std::iter::repeat(Bit::ZERO).take(width))
    }

    pub fn ones(width: usize) -> Self {
        Self::from_bits(std::iter::repeat(Bit::ONE).take(width))
    }

    pub fn width(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Bit] {
        &self.storage[self.start..self.start + self.len]
    }

    pub fn get(&self, index: usize) -> Option<Bit> {
        self.as_slice().get(index).copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Bit> + ExactSizeIterator + '_ {
        self.as_slice().iter().copied()
    }

    /// The concrete value of every bit, if all of them have one.
    pub fn value(&self) -> Option<Vec<bool>> {
        self.iter().map(|b| b.value()).collect()
    }

    /// Reads every bit through `cx`. A gate-backed bit poisons the trace.
    pub fn to_bools(&self, cx: &mut Trace) -> Result<Vec<bool>, TracingError> {
        self.iter().map(|b| b.to_bool(cx)).collect()
    }

    /// Reads a concrete vector as an unsigned integer. Only the low 64 bits
    /// survive.
    pub fn to_u64(&self, cx: &mut Trace) -> Result<u64, TracingError> {
        Ok(msb_first_to_u64(&self.to_bools(cx)?))
    }

    fn check_same_width(&self, other: &Bits, what: &str) -> Result<(), TracingError> {
        if self.len != other.len {
            return Err(TracingError::ShapeMismatch(format!(
                "{} of bits[{}] and bits[{}]",
                what, self.len, other.len
            )));
        }
        Ok(())
    }

    // -- Restructuring

    /// The bits in `start..end`, sharing storage with `self`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Bits, TracingError> {
        if start > end || end > self.len {
            return Err(TracingError::ShapeMismatch(format!(
                "slice {}..{} of bits[{}]",
                start, end, self.len
            )));
        }
        Ok(Bits {
            storage: Arc::clone(&self.storage),
            start: self.start + start,
            len: end - start,
        })
    }

    /// `self` followed by `other`; `self` ends up in the most significant
    /// positions.
    pub fn concat(&self, other: &Bits) -> Bits {
        Bits::from_bits(self.iter().chain(other.iter()))
    }

    pub fn concat_all(parts: &[Bits]) -> Bits {
        Bits::from_bits(parts.iter().flat_map(|p| p.iter()))
    }

    /// Splits into `count` equal parts.
    pub fn split_into(&self, count: usize) -> Result<Vec<Bits>, TracingError> {
        if count == 0 || self.len % count != 0 {
            return Err(TracingError::ShapeMismatch(format!(
                "cannot split bits[{}] into {} equal parts",
                self.len, count
            )));
        }
        self.chunks(self.len / count)
    }

    /// Splits into consecutive parts of `part_width` bits each.
    pub fn chunks(&self, part_width: usize) -> Result<Vec<Bits>, TracingError> {
        if part_width == 0 || self.len % part_width != 0 {
            return Err(TracingError::ShapeMismatch(format!(
                "cannot split bits[{}] into parts of {} bits",
                self.len, part_width
            )));
        }
        (0..self.len / part_width)
            .map(|i| self.slice(i * part_width, (i + 1) * part_width))
            .collect()
    }

    /// Splits into consecutive parts of the given widths, which must add up to
    /// the width of `self`.
    pub fn split_lengths(&self, widths: &[usize]) -> Result<Vec<Bits>, TracingError> {
        let total: usize = widths.iter().sum();
        if total != self.len {
            return Err(TracingError::ShapeMismatch(format!(
                "parts {:?} do not add up to bits[{}]",
                widths, self.len
            )));
        }
        let mut start = 0;
        let mut parts = Vec::with_capacity(widths.len());
        for width in widths {
            parts.push(self.slice(start, start + width)?);
            start += width;
        }
        Ok(parts)
    }

    /// Logical shift towards the most significant end, filling with zeros.
    pub fn shl(&self, amount: usize) -> Bits {
        let amount = amount.min(self.len);
        Bits::from_bits(
            self.iter()
                .skip(amount)
                .chain(std::iter::repeat(Bit::ZERO).take(amount)),
        )
    }

    /// Logical shift towards the least significant end, filling with zeros.
    pub fn shr(&self, amount: usize) -> Bits {
        let amount = amount.min(self.len);
        Bits::from_bits(
            std::iter::repeat(Bit::ZERO)
                .take(amount)
                .chain(self.iter().take(self.len - amount)),
        )
    }

    pub fn rotl(&self, amount: usize) -> Bits {
        if self.len == 0 {
            return self.clone();
        }
        let amount = amount % self.len;
        Bits::from_bits(self.iter().skip(amount).chain(self.iter().take(amount)))
    }

    pub fn rotr(&self, amount: usize) -> Bits {
        if self.len == 0 {
            return self.clone();
        }
        self.rotl(self.len - amount % self.len)
    }

    // -- Element-wise

    /// Applies `op` to each pair of corresponding bits.
    pub fn zip_with(&self, cx: &mut Trace, op: GateOp, other: &Bits) -> Result<Bits, TracingError> {
        self.check_same_width(other, op.mnemonic())?;
        let bits = self
            .iter()
            .zip(other.iter())
            .map(|(a, b)| cx.apply(op, &[a, b]))
            .collect::<Result<Vec<Bit>, TracingError>>()?;
        Ok(Bits::from_bits(bits))
    }

    pub fn not(&self, cx: &mut Trace) -> Result<Bits, TracingError> {
        let bits = self
            .iter()
            .map(|b| b.not(cx))
            .collect::<Result<Vec<Bit>, TracingError>>()?;
        Ok(Bits::from_bits(bits))
    }

    pub fn and(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::And, other)
    }

    pub fn or(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Or, other)
    }

    pub fn xor(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Xor, other)
    }

    pub fn nand(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Nand, other)
    }

    pub fn nor(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Nor, other)
    }

    pub fn xnor(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Xnor, other)
    }

    pub fn imp(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Imp, other)
    }

    pub fn nimp(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Nimp, other)
    }

    pub fn if_(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::If, other)
    }

    pub fn nif(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.zip_with(cx, GateOp::Nif, other)
    }

    /// Bit-wise `sel ? on_true : on_false`.
    pub fn mux(
        cx: &mut Trace,
        sel: impl BitOperand,
        on_true: &Bits,
        on_false: &Bits,
    ) -> Result<Bits, TracingError> {
        let sel = sel.to_bit()?;
        on_true.check_same_width(on_false, "mux")?;
        let bits = on_true
            .iter()
            .zip(on_false.iter())
            .map(|(t, f)| sel.mux(cx, t, f))
            .collect::<Result<Vec<Bit>, TracingError>>()?;
        Ok(Bits::from_bits(bits))
    }

    // -- Arithmetic, modulo 2^width

    /// Ripple-carry addition. Returns the sum and the carry out of the most
    /// significant position.
    pub fn add_with_carry(
        &self,
        cx: &mut Trace,
        other: &Bits,
        carry_in: impl BitOperand,
    ) -> Result<(Bits, Bit), TracingError> {
        self.check_same_width(other, "add")?;
        let mut carry = carry_in.to_bit()?;
        let mut sum = vec![Bit::ZERO; self.len];
        for i in (0..self.len).rev() {
            let (a, b) = (self[i], other[i]);
            // With no carry coming in the stage is a half adder.
            let (s, c) = if carry == Bit::ZERO {
                a.half_adder(cx, b)?
            } else {
                a.full_adder(cx, b, carry)?
            };
            sum[i] = s;
            carry = c;
        }
        Ok((Bits::from_bits(sum), carry))
    }

    pub fn add(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        Ok(self.add_with_carry(cx, other, Bit::ZERO)?.0)
    }

    /// `self + !other + 1`
    pub fn sub(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        let inverted = other.not(cx)?;
        Ok(self.add_with_carry(cx, &inverted, Bit::ONE)?.0)
    }

    /// Two's complement negation.
    pub fn neg(&self, cx: &mut Trace) -> Result<Bits, TracingError> {
        Bits::zeros(self.len).sub(cx, self)
    }

    /// Shift-and-add multiplication keeping the low `width` bits.
    pub fn mul(&self, cx: &mut Trace, other: &Bits) -> Result<Bits, TracingError> {
        self.check_same_width(other, "mul")?;
        let mut product: Option<Bits> = None;
        for shift in 0..self.len {
            let multiplier_bit = other[self.len - 1 - shift];
            let shifted = self.shl(shift);
            let partial = Bits::from_bits(
                shifted
                    .iter()
                    .map(|b| b.and(cx, multiplier_bit))
                    .collect::<Result<Vec<Bit>, TracingError>>()?,
            );
            product = Some(match product {
                None => partial,
                Some(acc) => acc.add(cx, &partial)?,
            });
        }
        Ok(product.unwrap_or_else(|| Bits::zeros(0)))
    }

    // -- Comparison

    pub fn eq(&self, cx: &mut Trace, other: &Bits) -> Result<Bit, TracingError> {
        self.xnor(cx, other)?.and_reduce(cx, ReductionKind::Linear)
    }

    pub fn ne(&self, cx: &mut Trace, other: &Bits) -> Result<Bit, TracingError> {
        self.xor(cx, other)?.or_reduce(cx, ReductionKind::Linear)
    }

    /// Unsigned `self >= other`: the carry out of `self + !other + 1`.
    pub fn uge(&self, cx: &mut Trace, other: &Bits) -> Result<Bit, TracingError> {
        self.check_same_width(other, "compare")?;
        let mut carry = Bit::ONE;
        for i in (0..self.len).rev() {
            let a = self[i];
            let not_b = other[i].not(cx)?;
            let generate = a.and(cx, not_b)?;
            let propagate = a.xor(cx, not_b)?.and(cx, carry)?;
            carry = generate.or(cx, propagate)?;
        }
        Ok(carry)
    }

    pub fn ult(&self, cx: &mut Trace, other: &Bits) -> Result<Bit, TracingError> {
        self.uge(cx, other)?.not(cx)
    }

    pub fn ugt(&self, cx: &mut Trace, other: &Bits) -> Result<Bit, TracingError> {
        other.ult(cx, self)
    }

    pub fn ule(&self, cx: &mut Trace, other: &Bits) -> Result<Bit, TracingError> {
        other.uge(cx, self)
    }

    // -- Reductions

    /// Folds every bit with `op`. An empty vector reduces to `identity`.
    pub fn reduce(
        &self,
        cx: &mut Trace,
        op: GateOp,
        identity: bool,
        kind: ReductionKind,
    ) -> Result<Bit, TracingError> {
        if self.is_empty() {
            return Ok(Bit::Const(identity));
        }
        match kind {
            ReductionKind::Linear => {
                let mut acc = self[0];
                for bit in self.iter().skip(1) {
                    acc = cx.apply(op, &[acc, bit])?;
                }
                Ok(acc)
            }
            ReductionKind::Tree => tree_reduce(cx, op, self.as_slice()),
        }
    }

    pub fn and_reduce(&self, cx: &mut Trace, kind: ReductionKind) -> Result<Bit, TracingError> {
        self.reduce(cx, GateOp::And, true, kind)
    }

    pub fn or_reduce(&self, cx: &mut Trace, kind: ReductionKind) -> Result<Bit, TracingError> {
        self.reduce(cx, GateOp::Or, false, kind)
    }

    pub fn xor_reduce(&self, cx: &mut Trace, kind: ReductionKind) -> Result<Bit, TracingError> {
        self.reduce(cx, GateOp::Xor, false, kind)
    }
}

fn tree_reduce(cx: &mut Trace, op: GateOp, bits: &[Bit]) -> Result<Bit, TracingError> {
    if bits.len() == 1 {
        return Ok(bits[0]);
    }
    let mid = bits.len() / 2;
    log::trace!("tree_reduce {}: {} => {} + {}", op.mnemonic(), bits.len(), mid, bits.len() - mid);
    let lhs = tree_reduce(cx, op, &bits[..mid])?;
    let rhs = tree_reduce(cx, op, &bits[mid..])?;
    cx.apply(op, &[lhs, rhs])
}

impl std::ops::Index<usize> for Bits {
    type Output = Bit;

    fn index(&self, index: usize) -> &Bit {
        &self.as_slice()[index]
    }
}

impl PartialEq for Bits {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Bits {}

impl FromIterator<Bit> for Bits {
    fn from_iter<I: IntoIterator<Item = Bit>>(iter: I) -> Self {
        Bits::from_bits(iter)
    }
}

impl From<Vec<Bit>> for Bits {
    fn from(bits: Vec<Bit>) -> Self {
        Bits::from_bits(bits)
    }
}

impl std::fmt::Debug for Bits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl std::fmt::Display for Bits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "[{}]", parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{Circuit, Shape};
    use crate::gate_builder::GateBuilderOptions;
    use crate::synthesize::Signal;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const WIDTH: usize = 4;

    fn trace_binary(
        options: GateBuilderOptions,
        f: impl Fn(&mut Trace, &Bits, &Bits) -> Result<Signal, TracingError>,
    ) -> Circuit {
        let mut cx = Trace::with_options("binary", options);
        let a = cx.input_bits("a", WIDTH).unwrap();
        let b = cx.input_bits("b", WIDTH).unwrap();
        let o = f(&mut cx, &a, &b).unwrap();
        cx.output("o", o.shape(), &o).unwrap();
        cx.finish().unwrap()
    }

    fn check_exhaustive(circuit: &Circuit, want: impl Fn(u64, u64) -> u64) {
        let mask = (1u64 << WIDTH) - 1;
        for a in 0..=mask {
            for b in 0..=mask {
                assert_eq!(
                    circuit.evaluate_u64(&[a, b]).unwrap(),
                    vec![want(a, b)],
                    "a={} b={}",
                    a,
                    b
                );
            }
        }
    }

    #[test_case(GateBuilderOptions::strict(); "strict")]
    #[test_case(GateBuilderOptions::opt(); "opt")]
    fn test_arithmetic_exhaustive(options: GateBuilderOptions) {
        let mask = (1u64 << WIDTH) - 1;
        let add = trace_binary(options, |cx, a, b| Ok(a.add(cx, b)?.into()));
        check_exhaustive(&add, |a, b| (a + b) & mask);
        let sub = trace_binary(options, |cx, a, b| Ok(a.sub(cx, b)?.into()));
        check_exhaustive(&sub, |a, b| a.wrapping_sub(b) & mask);
        let mul = trace_binary(options, |cx, a, b| Ok(a.mul(cx, b)?.into()));
        check_exhaustive(&mul, |a, b| (a * b) & mask);
        let neg = trace_binary(options, |cx, a, _| Ok(a.neg(cx)?.into()));
        check_exhaustive(&neg, |a, _| a.wrapping_neg() & mask);
    }

    #[test]
    fn test_comparisons_exhaustive() {
        let options = GateBuilderOptions::strict();
        let eq = trace_binary(options, |cx, a, b| Ok(a.eq(cx, b)?.into()));
        check_exhaustive(&eq, |a, b| u64::from(a == b));
        let ne = trace_binary(options, |cx, a, b| Ok(a.ne(cx, b)?.into()));
        check_exhaustive(&ne, |a, b| u64::from(a != b));
        let ult = trace_binary(options, |cx, a, b| Ok(a.ult(cx, b)?.into()));
        check_exhaustive(&ult, |a, b| u64::from(a < b));
        let ule = trace_binary(options, |cx, a, b| Ok(a.ule(cx, b)?.into()));
        check_exhaustive(&ule, |a, b| u64::from(a <= b));
        let ugt = trace_binary(options, |cx, a, b| Ok(a.ugt(cx, b)?.into()));
        check_exhaustive(&ugt, |a, b| u64::from(a > b));
        let uge = trace_binary(options, |cx, a, b| Ok(a.uge(cx, b)?.into()));
        check_exhaustive(&uge, |a, b| u64::from(a >= b));
    }

    #[test]
    fn test_add_with_carry_out() {
        let mut cx = Trace::new("carry");
        let a = Bits::from_u64(0b1111, 4);
        let b = Bits::from_u64(0b0001, 4);
        let (sum, carry) = a.add_with_carry(&mut cx, &b, 0u8).unwrap();
        assert_eq!(sum.to_u64(&mut cx).unwrap(), 0);
        assert_eq!(carry, Bit::ONE);
        assert_eq!(cx.node_count(), 0);
    }

    #[test]
    fn test_shifts_and_rotations() {
        let mut cx = Trace::new("shifts");
        let x = Bits::constants(&[1, 0, 1, 1]).unwrap();
        assert_eq!(x.shl(1).to_u64(&mut cx).unwrap(), 0b0110);
        assert_eq!(x.shr(1).to_u64(&mut cx).unwrap(), 0b0101);
        assert_eq!(x.shr(9).to_u64(&mut cx).unwrap(), 0);
        assert_eq!(x.rotl(1).to_u64(&mut cx).unwrap(), 0b0111);
        assert_eq!(x.rotr(1).to_u64(&mut cx).unwrap(), 0b1101);
        assert_eq!(x.rotr(5), x.rotr(1));
        assert_eq!(Bits::zeros(0).rotl(3).width(), 0);
    }

    #[test]
    fn test_slices_share_storage() {
        let mut cx = Trace::new("slices");
        let x = Bits::from_bytes(&[0xa5, 0x0f]);
        assert_eq!(x.width(), 16);
        let halves = x.split_into(2).unwrap();
        assert!(Arc::ptr_eq(&halves[1].storage, &x.storage));
        assert_eq!(halves[0].to_u64(&mut cx).unwrap(), 0xa5);
        assert_eq!(halves[1].to_u64(&mut cx).unwrap(), 0x0f);
        let inner = halves[0].slice(2, 6).unwrap();
        assert_eq!(inner.to_u64(&mut cx).unwrap(), 0b1001);
        assert_eq!(inner[0], Bit::ONE);
        let parts = x.split_lengths(&[4, 12]).unwrap();
        assert_eq!(parts[0].to_u64(&mut cx).unwrap(), 0xa);
        assert_eq!(parts[1].concat(&parts[0]).to_u64(&mut cx).unwrap(), 0x50fa);
    }

    #[test]
    fn test_structural_errors() {
        let x = Bits::zeros(6);
        assert!(matches!(x.split_into(4), Err(TracingError::ShapeMismatch(_))));
        assert!(matches!(x.chunks(0), Err(TracingError::ShapeMismatch(_))));
        assert!(matches!(x.split_lengths(&[1, 2]), Err(TracingError::ShapeMismatch(_))));
        assert!(matches!(x.slice(4, 7), Err(TracingError::ShapeMismatch(_))));
        let mut cx = Trace::new("widths");
        assert!(matches!(
            x.and(&mut cx, &Bits::zeros(5)),
            Err(TracingError::ShapeMismatch(_))
        ));
        assert!(matches!(Bits::constants(&[0, 2]), Err(TracingError::InvalidLiteral(_))));
    }

    #[test]
    fn test_empty_reductions_are_identities() {
        let mut cx = Trace::new("empty");
        let empty = Bits::zeros(0);
        for kind in [ReductionKind::Linear, ReductionKind::Tree] {
            assert_eq!(empty.and_reduce(&mut cx, kind).unwrap(), Bit::ONE);
            assert_eq!(empty.or_reduce(&mut cx, kind).unwrap(), Bit::ZERO);
            assert_eq!(empty.xor_reduce(&mut cx, kind).unwrap(), Bit::ZERO);
        }
    }

    #[test_case(ReductionKind::Linear; "linear")]
    #[test_case(ReductionKind::Tree; "tree")]
    fn test_reductions(kind: ReductionKind) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut cx = Trace::new("reduce");
        let x = cx.input_bits("x", 8).unwrap();
        let all = x.and_reduce(&mut cx, kind).unwrap();
        let parity = x.xor_reduce(&mut cx, kind).unwrap();
        assert_eq!(cx.gate_count(), 14);
        cx.output("all", Shape::Bit, &Signal::Bit(all)).unwrap();
        cx.output("parity", Shape::Bit, &Signal::Bit(parity)).unwrap();
        let circuit = cx.finish().unwrap();
        for value in [0u64, 0xff, 0x81, 0x7f] {
            assert_eq!(
                circuit.evaluate_u64(&[value]).unwrap(),
                vec![u64::from(value == 0xff), u64::from(value.count_ones() % 2)]
            );
        }
    }

    #[test]
    fn test_mux_selects_vector() {
        let mut cx = Trace::new("mux");
        let s = cx.input_bit("s").unwrap();
        let t = Bits::from_u64(0b1100, 4);
        let f = Bits::from_u64(0b1010, 4);
        let o = Bits::mux(&mut cx, s, &t, &f).unwrap();
        cx.output("o", Shape::Bits(4), &Signal::Bits(o)).unwrap();
        let circuit = cx.finish().unwrap();
        assert_eq!(circuit.evaluate_u64(&[1]).unwrap(), vec![0b1100]);
        assert_eq!(circuit.evaluate_u64(&[0]).unwrap(), vec![0b1010]);
        assert_eq!(
            Bits::mux(&mut Trace::new("concrete"), true, &t, &f).unwrap(),
            t
        );
    }

    #[test]
    fn test_display() {
        let mut cx = Trace::new("display");
        let x = cx.input_bit("x").unwrap();
        let bits = Bits::from_bits([Bit::ONE, x, Bit::ZERO]);
        assert_eq!(bits.to_string(), "[1, %0, 0]");
    }
}
