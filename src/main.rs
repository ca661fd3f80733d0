// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, ValueEnum};

use circuitry::dce;
use circuitry::gate_builder::GateBuilderOptions;
use circuitry::get_summary_stats::get_summary_stats;
use circuitry::samples::{self, Body};
use circuitry::synthesize::{Synthesized, Value};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Sample {
    Equal,
    EqualsIterative,
    EqualsFunctional,
    Add32,
    Sha256,
}

/// Synthesizes one of the sample functions and reports on the circuit.
#[derive(Parser, Debug)]
struct Args {
    /// The sample function to synthesize.
    #[arg(value_enum)]
    sample: Sample,

    /// Whether to simplify partially-constant operations while tracing.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    simplify: bool,

    /// Fail synthesis once the graph holds this many nodes.
    #[arg(long)]
    max_gates: Option<usize>,

    /// Whether to remove gates no output depends on before reporting.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    prune: bool,

    /// Whether to print the circuit in its text form.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    emit_text: bool,

    /// Whether to print the circuit as JSON.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    emit_json: bool,

    /// Whether to print the summary statistics as JSON.
    #[arg(long, default_value_t = false)]
    #[arg(action = clap::ArgAction::Set)]
    stats_json: bool,

    /// Number of 512-bit message blocks for the sha256 sample.
    #[arg(long, default_value_t = 1)]
    sha256_blocks: usize,

    /// A message to hash with the synthesized sha256 circuit; the block count
    /// is derived from its length.
    #[arg(long)]
    sha256_message: Option<String>,
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();

    let mut options = if args.simplify {
        GateBuilderOptions::opt()
    } else {
        GateBuilderOptions::strict()
    };
    if let Some(max_gates) = args.max_gates {
        options = options.with_max_gates(max_gates);
    }

    let sha256_blocks = match &args.sha256_message {
        Some(message) => samples::sha256_block_count(message.len()),
        None => args.sha256_blocks,
    };
    let f: Synthesized<Body> = match args.sample {
        Sample::Equal => samples::equal(),
        Sample::EqualsIterative => samples::equals_iterative(),
        Sample::EqualsFunctional => samples::equals_functional(),
        Sample::Add32 => samples::add32(),
        Sample::Sha256 => samples::sha256(sha256_blocks),
    }
    .with_options(options);

    let circuit = f.circuit()?;
    log::info!(
        "synthesized {}: {} gates, {} nodes",
        circuit.get_signature(),
        circuit.gate_count(),
        circuit.node_count()
    );
    let circuit = if args.prune {
        dce::prune(circuit)
    } else {
        circuit.clone()
    };

    if args.emit_text {
        println!("{}", circuit);
    }
    if args.emit_json {
        println!("{}", serde_json::to_string_pretty(&circuit)?);
    }

    let stats = get_summary_stats(&circuit);
    if args.stats_json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("{}", circuit.get_signature());
        println!("  gates: {} (live: {})", stats.gate_count, stats.live_gates);
        println!("  depth: {}", stats.depth);
        println!("  max fanout: {}", stats.max_fanout);
    }

    if let (Sample::Sha256, Some(message)) = (args.sample, &args.sha256_message) {
        let padded = samples::sha256_pad(message.as_bytes());
        let outputs = circuit.evaluate(&[Value::from_bytes(&padded).to_bools()])?;
        let digest = Value::Bits(outputs[0].clone()).to_bytes();
        println!("sha256({:?}) = {}", message, to_hex(&digest));
    }
    Ok(())
}
