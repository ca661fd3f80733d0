// SPDX-License-Identifier: Apache-2.0

//! Records boolean functions written over symbolic bits as a deduplicated,
//! constant-folded gate DAG.

pub mod bit;
pub mod bits;
pub mod dce;
pub mod error;
pub mod gate;
pub mod gate_builder;
pub mod gate_hasher;
pub mod gate_sim;
pub mod get_summary_stats;
pub mod samples;
mod simplify;
pub mod synthesize;
pub mod trace;

pub use bit::{Bit, BitOperand};
pub use bits::{Bits, ReductionKind};
pub use error::{CircuitError, TracingError};
pub use gate::{Circuit, GateOp, GateRef, Shape};
pub use gate_builder::GateBuilderOptions;
pub use synthesize::{synthesize, Signal, Signature, Synthesized, Value};
pub use trace::Trace;
