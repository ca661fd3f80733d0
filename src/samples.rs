// SPDX-License-Identifier: Apache-2.0

//! Sample functions written against the tracing API: single-bit equality, two
//! ways of building 8-bit equality out of it, a 32-bit ripple adder, and the
//! SHA-256 compression function.

use once_cell::sync::Lazy;

use crate::bit::Bit;
use crate::bits::{Bits, ReductionKind};
use crate::error::TracingError;
use crate::gate::Shape;
use crate::synthesize::{Signal, Signature, Synthesized};
use crate::trace::Trace;

/// Signature shared by the statically declared samples.
pub type Body = fn(&mut Trace, &[Signal]) -> Result<Vec<Signal>, TracingError>;

fn equal_body(cx: &mut Trace, args: &[Signal]) -> Result<Vec<Signal>, TracingError> {
    let x = args[0].as_bit()?;
    let y = args[1].as_bit()?;
    let both = x.and(cx, y)?;
    let not_x = x.rsub(cx, 1)?;
    let not_y = y.rsub(cx, 1)?;
    let neither = not_x.and(cx, not_y)?;
    Ok(vec![both.or(cx, neither)?.into()])
}

/// `equal(x: bit, y: bit) -> (z: bit)`, computed as `(x & y) | ((1 - x) & (1 - y))`.
pub fn equal() -> Synthesized<Body> {
    Synthesized::new(
        "equal",
        Signature::new()
            .input("x", Shape::Bit)
            .input("y", Shape::Bit)
            .output("z", Shape::Bit),
        equal_body as Body,
    )
}

/// Shared instance of `equal`, which the 8-bit equality samples call into.
pub static EQUAL: Lazy<Synthesized<Body>> = Lazy::new(equal);

fn call_equal(cx: &mut Trace, x: Bit, y: Bit) -> Result<Bit, TracingError> {
    let results = EQUAL.apply(cx, &[x.into(), y.into()])?;
    results[0].as_bit()
}

fn equals_signature() -> Signature {
    Signature::new()
        .input("xs", Shape::Bits(8))
        .input("ys", Shape::Bits(8))
        .output("z", Shape::Bit)
}

fn equals_iterative_body(cx: &mut Trace, args: &[Signal]) -> Result<Vec<Signal>, TracingError> {
    let xs = args[0].as_bits()?;
    let ys = args[1].as_bits()?;
    let mut z = Bit::ONE;
    for i in 0..xs.width() {
        let e = call_equal(cx, xs[i], ys[i])?;
        z = z.and(cx, e)?;
    }
    Ok(vec![z.into()])
}

/// 8-bit equality as a loop that starts from the constant 1 and conjoins one
/// `equal` per position.
pub fn equals_iterative() -> Synthesized<Body> {
    Synthesized::new("equals_iterative", equals_signature(), equals_iterative_body as Body)
}

fn equals_functional_body(cx: &mut Trace, args: &[Signal]) -> Result<Vec<Signal>, TracingError> {
    let xs = args[0].as_bits()?;
    let ys = args[1].as_bits()?;
    let es = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| call_equal(cx, x, y))
        .collect::<Result<Bits, TracingError>>()?;
    Ok(vec![es.and_reduce(cx, ReductionKind::Linear)?.into()])
}

/// 8-bit equality as a fold over the per-position `equal` results.
pub fn equals_functional() -> Synthesized<Body> {
    Synthesized::new("equals_functional", equals_signature(), equals_functional_body as Body)
}

fn add32_body(cx: &mut Trace, args: &[Signal]) -> Result<Vec<Signal>, TracingError> {
    let xs = args[0].as_bits()?;
    let ys = args[1].as_bits()?;
    Ok(vec![xs.add(cx, ys)?.into()])
}

/// 32-bit ripple-carry addition modulo 2^32.
pub fn add32() -> Synthesized<Body> {
    Synthesized::new(
        "add32",
        Signature::new()
            .input("xs", Shape::Bits(32))
            .input("ys", Shape::Bits(32))
            .output("zs", Shape::Bits(32)),
        add32_body as Body,
    )
}

const SHA256_ROUND_CONSTANTS: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

const SHA256_INITIAL_DIGEST: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

pub const SHA256_BLOCK_BITS: usize = 512;
pub const SHA256_DIGEST_BITS: usize = 256;

fn word(value: u32) -> Bits {
    Bits::from_u64(u64::from(value), 32)
}

fn xor3(cx: &mut Trace, a: &Bits, b: &Bits, c: &Bits) -> Result<Bits, TracingError> {
    a.xor(cx, b)?.xor(cx, c)
}

fn choose(cx: &mut Trace, x: &Bits, y: &Bits, z: &Bits) -> Result<Bits, TracingError> {
    let picked_y = x.and(cx, y)?;
    let picked_z = x.nif(cx, z)?;
    picked_y.xor(cx, &picked_z)
}

fn majority(cx: &mut Trace, x: &Bits, y: &Bits, z: &Bits) -> Result<Bits, TracingError> {
    let xy = x.and(cx, y)?;
    let xz = x.and(cx, z)?;
    let yz = y.and(cx, z)?;
    xor3(cx, &xy, &xz, &yz)
}

fn big_sigma0(cx: &mut Trace, x: &Bits) -> Result<Bits, TracingError> {
    xor3(cx, &x.rotr(2), &x.rotr(13), &x.rotr(22))
}

fn big_sigma1(cx: &mut Trace, x: &Bits) -> Result<Bits, TracingError> {
    xor3(cx, &x.rotr(6), &x.rotr(11), &x.rotr(25))
}

fn small_sigma0(cx: &mut Trace, x: &Bits) -> Result<Bits, TracingError> {
    xor3(cx, &x.rotr(7), &x.rotr(18), &x.shr(3))
}

fn small_sigma1(cx: &mut Trace, x: &Bits) -> Result<Bits, TracingError> {
    xor3(cx, &x.rotr(17), &x.rotr(19), &x.shr(10))
}

/// One application of the compression function: folds a 512-bit `block`
/// into the eight 32-bit words of `digest`.
fn sha256_compress(cx: &mut Trace, digest: &[Bits], block: &Bits) -> Result<Vec<Bits>, TracingError> {
    let mut w = block.chunks(32)?;
    for j in 16..64 {
        let s1 = small_sigma1(cx, &w[j - 2])?;
        let s0 = small_sigma0(cx, &w[j - 15])?;
        let next = s1.add(cx, &w[j - 7])?.add(cx, &s0)?.add(cx, &w[j - 16])?;
        w.push(next);
    }

    let mut v = digest.to_vec();
    for j in 0..64 {
        let ch = choose(cx, &v[4], &v[5], &v[6])?;
        let c = ch.add(cx, &word(SHA256_ROUND_CONSTANTS[j]))?.add(cx, &w[j])?;
        let s1 = big_sigma1(cx, &v[4])?;
        let t1 = v[7].add(cx, &s1)?.add(cx, &c)?;
        let s0 = big_sigma0(cx, &v[0])?;
        let maj = majority(cx, &v[0], &v[1], &v[2])?;
        let t2 = s0.add(cx, &maj)?;
        v = vec![
            t1.add(cx, &t2)?,
            v[0].clone(),
            v[1].clone(),
            v[2].clone(),
            v[3].add(cx, &t1)?,
            v[4].clone(),
            v[5].clone(),
            v[6].clone(),
        ];
    }

    digest
        .iter()
        .zip(v.iter())
        .map(|(d, x)| d.add(cx, x))
        .collect()
}

fn sha256_body(cx: &mut Trace, args: &[Signal]) -> Result<Vec<Signal>, TracingError> {
    let message = args[0].as_bits()?;
    let mut digest: Vec<Bits> = SHA256_INITIAL_DIGEST.iter().map(|h| word(*h)).collect();
    for (i, block) in message.chunks(SHA256_BLOCK_BITS)?.iter().enumerate() {
        log::debug!("sha256: compressing block {}", i);
        digest = sha256_compress(cx, &digest, block)?;
    }
    Ok(vec![Bits::concat_all(&digest).into()])
}

/// SHA-256 over an already padded message of `blocks` 512-bit blocks. The
/// circuit has to be synthesized separately for every message length.
pub fn sha256(blocks: usize) -> Synthesized<Body> {
    Synthesized::new(
        &format!("sha256_{}", blocks),
        Signature::new()
            .input("message", Shape::Bits(SHA256_BLOCK_BITS * blocks))
            .output("digest", Shape::Bits(SHA256_DIGEST_BITS)),
        sha256_body as Body,
    )
}

/// Applies the standard SHA-256 padding: a one bit, zeros, and the message
/// length in bits as a big-endian 64-bit integer.
pub fn sha256_pad(message: &[u8]) -> Vec<u8> {
    let mut padded = message.to_vec();
    padded.push(0x80);
    while padded.len() % 64 != 56 {
        padded.push(0);
    }
    padded.extend_from_slice(&((message.len() as u64) * 8).to_be_bytes());
    padded
}

/// Number of 512-bit blocks a message of `length` bytes occupies once padded.
pub fn sha256_block_count(length: usize) -> usize {
    (length + 9 + 63) / 64
}
