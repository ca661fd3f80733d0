// SPDX-License-Identifier: Apache-2.0

//! Turns an ordinary Rust function over symbolic bits into a circuit.
//!
//! A function body has the shape
//! `Fn(&mut Trace, &[Signal]) -> Result<Vec<Signal>, TracingError>`: it
//! receives one `Signal` per declared input and returns one per declared
//! output. `Synthesized` bundles such a body with its `Signature` and the
//! circuit traced from it.
//!
//! ```
//! use circuitry::gate::Shape;
//! use circuitry::synthesize::{synthesize, Signal, Signature, Value};
//!
//! let and = synthesize(
//!     "and",
//!     Signature::new()
//!         .input("x", Shape::Bit)
//!         .input("y", Shape::Bit)
//!         .output("z", Shape::Bit),
//!     |cx, args| {
//!         let z = args[0].as_bit()?.and(cx, args[1].as_bit()?)?;
//!         Ok(vec![Signal::Bit(z)])
//!     },
//! )
//! .unwrap();
//! assert_eq!(and.circuit().unwrap().gate_count(), 1);
//! assert_eq!(
//!     and.evaluate(&[Value::Bit(true), Value::Bit(true)]).unwrap(),
//!     vec![Value::Bit(true)]
//! );
//! ```

use once_cell::sync::OnceCell;

use crate::bit::Bit;
use crate::bits::Bits;
use crate::error::TracingError;
use crate::gate::{msb_first_to_u64, u64_to_msb_first, Circuit, Shape};
use crate::gate_builder::GateBuilderOptions;
use crate::trace::Trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub shape: Shape,
}

/// Declared names and shapes of a function's inputs and outputs, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, name: &str, shape: Shape) -> Self {
        self.inputs.push(Param {
            name: name.to_string(),
            shape,
        });
        self
    }

    pub fn output(mut self, name: &str, shape: Shape) -> Self {
        self.outputs.push(Param {
            name: name.to_string(),
            shape,
        });
        self
    }

    pub fn input_shapes(&self) -> impl Iterator<Item = Shape> + '_ {
        self.inputs.iter().map(|p| p.shape)
    }

    pub fn output_shapes(&self) -> impl Iterator<Item = Shape> + '_ {
        self.outputs.iter().map(|p| p.shape)
    }
}

fn params_to_string(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.shape))
        .collect::<Vec<String>>()
        .join(", ")
}

/// Checks that `got` lines up with the declared `params`.
fn check_shapes(
    function: &str,
    role: &str,
    params: &[Param],
    got: &[Shape],
) -> Result<(), TracingError> {
    if params.len() != got.len() {
        return Err(TracingError::ShapeMismatch(format!(
            "`{}` declares {} {}(s), got {}",
            function,
            params.len(),
            role,
            got.len()
        )));
    }
    for (param, shape) in params.iter().zip(got) {
        if param.shape != *shape {
            return Err(TracingError::ShapeMismatch(format!(
                "`{}` {} `{}` is declared as {}, got {}",
                function, role, param.name, param.shape, shape
            )));
        }
    }
    Ok(())
}

/// A symbolic argument or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Bit(Bit),
    Bits(Bits),
}

impl Signal {
    pub fn shape(&self) -> Shape {
        match self {
            Signal::Bit(_) => Shape::Bit,
            Signal::Bits(bits) => Shape::Bits(bits.width()),
        }
    }

    pub fn as_bit(&self) -> Result<Bit, TracingError> {
        match self {
            Signal::Bit(bit) => Ok(*bit),
            Signal::Bits(bits) => Err(TracingError::ShapeMismatch(format!(
                "expected bit, got bits[{}]",
                bits.width()
            ))),
        }
    }

    pub fn as_bits(&self) -> Result<&Bits, TracingError> {
        match self {
            Signal::Bits(bits) => Ok(bits),
            Signal::Bit(_) => Err(TracingError::ShapeMismatch(
                "expected bits, got bit".to_string(),
            )),
        }
    }
}

impl From<Bit> for Signal {
    fn from(bit: Bit) -> Self {
        Signal::Bit(bit)
    }
}

impl From<Bits> for Signal {
    fn from(bits: Bits) -> Self {
        Signal::Bits(bits)
    }
}

/// A host value for one port. Vectors are most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bit(bool),
    Bits(Vec<bool>),
}

impl Value {
    pub fn from_u64(value: u64, width: usize) -> Self {
        Value::Bits(u64_to_msb_first(value, width))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Value::Bits(
            bytes
                .iter()
                .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
                .collect(),
        )
    }

    pub fn shape(&self) -> Shape {
        match self {
            Value::Bit(_) => Shape::Bit,
            Value::Bits(bits) => Shape::Bits(bits.len()),
        }
    }

    pub fn to_bools(&self) -> Vec<bool> {
        match self {
            Value::Bit(b) => vec![*b],
            Value::Bits(bits) => bits.clone(),
        }
    }

    /// Only the low 64 bits of a wider vector survive.
    pub fn to_u64(&self) -> u64 {
        msb_first_to_u64(&self.to_bools())
    }

    /// Packs the bits into bytes, first bit in the top of the first byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bools()
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, b)| acc | (u8::from(*b) << (7 - i)))
            })
            .collect()
    }

    fn from_bools(shape: Shape, bits: Vec<bool>) -> Self {
        match shape {
            Shape::Bit => Value::Bit(bits[0]),
            Shape::Bits(_) => Value::Bits(bits),
        }
    }

    pub fn to_signal(&self) -> Signal {
        match self {
            Value::Bit(b) => Signal::Bit(Bit::Const(*b)),
            Value::Bits(bits) => Signal::Bits(Bits::from_bools(bits)),
        }
    }

    /// Reads `signal` through `cx`; fails with `IllegalConcreteRead` if any
    /// bit is backed by a gate.
    pub fn from_signal(cx: &mut Trace, signal: &Signal) -> Result<Self, TracingError> {
        match signal {
            Signal::Bit(bit) => Ok(Value::Bit(bit.to_bool(cx)?)),
            Signal::Bits(bits) => Ok(Value::Bits(bits.to_bools(cx)?)),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bit(b) => write!(f, "{}", u8::from(*b)),
            Value::Bits(bits) => {
                let digits: String = bits.iter().map(|b| if *b { '1' } else { '0' }).collect();
                write!(f, "0b{}", digits)
            }
        }
    }
}

/// A function body together with its signature and, once traced, its
/// circuit.
///
/// The circuit is traced on first demand (`circuit`, `evaluate`) and never
/// changes afterwards. If tracing fails the function stays untraced and the
/// error is returned to the caller.
pub struct Synthesized<F> {
    name: String,
    signature: Signature,
    options: GateBuilderOptions,
    body: F,
    circuit: OnceCell<Circuit>,
}

impl<F> Synthesized<F>
where
    F: Fn(&mut Trace, &[Signal]) -> Result<Vec<Signal>, TracingError>,
{
    pub fn new(name: &str, signature: Signature, body: F) -> Self {
        Self {
            name: name.to_string(),
            signature,
            options: GateBuilderOptions::default(),
            body,
            circuit: OnceCell::new(),
        }
    }

    /// Replaces the builder options, discarding any circuit traced so far.
    pub fn with_options(self, options: GateBuilderOptions) -> Self {
        Self {
            options,
            circuit: OnceCell::new(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn options(&self) -> GateBuilderOptions {
        self.options
    }

    pub fn is_traced(&self) -> bool {
        self.circuit.get().is_some()
    }

    /// Returns the traced circuit, tracing the body first if needed.
    pub fn circuit(&self) -> Result<&Circuit, TracingError> {
        self.circuit.get_or_try_init(|| self.trace())
    }

    fn trace(&self) -> Result<Circuit, TracingError> {
        log::debug!(
            "synthesizing fn {}({}) -> ({})",
            self.name,
            params_to_string(&self.signature.inputs),
            params_to_string(&self.signature.outputs)
        );
        let mut cx = Trace::with_options(&self.name, self.options);
        let args = self
            .signature
            .inputs
            .iter()
            .map(|param| cx.input(&param.name, param.shape))
            .collect::<Result<Vec<Signal>, TracingError>>()?;
        let results = (self.body)(&mut cx, &args)?;
        let shapes: Vec<Shape> = results.iter().map(Signal::shape).collect();
        check_shapes(&self.name, "output", &self.signature.outputs, &shapes)?;
        for (param, signal) in self.signature.outputs.iter().zip(results.iter()) {
            cx.output(&param.name, param.shape, signal)?;
        }
        let circuit = cx.finish()?;
        log::debug!(
            "synthesized `{}`: {} gates, {} nodes",
            self.name,
            circuit.gate_count(),
            circuit.node_count()
        );
        Ok(circuit)
    }

    /// Traces the body inline into `cx`, extending the caller's graph. Used
    /// when one synthesized function calls another: the result is a single
    /// flat graph in which gates are shared across the call boundary.
    pub fn apply(&self, cx: &mut Trace, args: &[Signal]) -> Result<Vec<Signal>, TracingError> {
        let shapes: Vec<Shape> = args.iter().map(Signal::shape).collect();
        check_shapes(&self.name, "input", &self.signature.inputs, &shapes)?;
        let results = (self.body)(cx, args)?;
        let shapes: Vec<Shape> = results.iter().map(Signal::shape).collect();
        check_shapes(&self.name, "output", &self.signature.outputs, &shapes)?;
        Ok(results)
    }

    /// Runs the body directly on host values. Every operation folds, so this
    /// never consults or extends the traced circuit.
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>, TracingError> {
        let mut cx = Trace::new(&self.name);
        let signals: Vec<Signal> = args.iter().map(Value::to_signal).collect();
        let results = self.apply(&mut cx, &signals)?;
        results
            .iter()
            .map(|signal| Value::from_signal(&mut cx, signal))
            .collect()
    }

    /// Evaluates the traced circuit on host values.
    pub fn evaluate(&self, args: &[Value]) -> Result<Vec<Value>, TracingError> {
        let shapes: Vec<Shape> = args.iter().map(Value::shape).collect();
        check_shapes(&self.name, "input", &self.signature.inputs, &shapes)?;
        let circuit = self.circuit()?;
        let inputs: Vec<Vec<bool>> = args.iter().map(Value::to_bools).collect();
        let outputs = circuit.evaluate(&inputs)?;
        Ok(self
            .signature
            .output_shapes()
            .zip(outputs)
            .map(|(shape, bits)| Value::from_bools(shape, bits))
            .collect())
    }
}

/// Wraps `body` and traces it right away, so that a function that cannot be
/// synthesized is rejected here rather than on first use.
pub fn synthesize<F>(name: &str, signature: Signature, body: F) -> Result<Synthesized<F>, TracingError>
where
    F: Fn(&mut Trace, &[Signal]) -> Result<Vec<Signal>, TracingError>,
{
    synthesize_with_options(name, signature, GateBuilderOptions::default(), body)
}

pub fn synthesize_with_options<F>(
    name: &str,
    signature: Signature,
    options: GateBuilderOptions,
    body: F,
) -> Result<Synthesized<F>, TracingError>
where
    F: Fn(&mut Trace, &[Signal]) -> Result<Vec<Signal>, TracingError>,
{
    let synthesized = Synthesized::new(name, signature, body).with_options(options);
    synthesized.circuit()?;
    Ok(synthesized)
}
