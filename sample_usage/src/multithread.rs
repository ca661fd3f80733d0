// SPDX-License-Identifier: Apache-2.0

//! Example of sharing a synthesized circuit across threads, and of tracing on
//! several threads at once.

use lazy_static::lazy_static;
use rayon::prelude::*;

use circuitry::samples::{self, Body};
use circuitry::synthesize::{Synthesized, Value};

lazy_static! {
    // Traced once, on first use, by whichever thread gets there first.
    static ref ADD32: Synthesized<Body> = samples::add32();
}

pub fn validate_all_threads_compute_add32() {
    // Use rayon to evaluate the adder in parallel on every available core.
    let results: Vec<u64> = (0..num_cpus::get() as u64)
        .into_par_iter()
        .map(|i| {
            let outputs = ADD32
                .evaluate(&[Value::from_u64(i, 32), Value::from_u64(1, 32)])
                .expect("evaluate failed");
            outputs[0].to_u64()
        })
        .collect();

    // Check that all the results are index+1.
    for (i, result) in results.iter().enumerate() {
        assert_eq!(*result, i as u64 + 1);
    }
}

/// Every thread traces its own copy of the same function into its own graph;
/// the graphs come out identical.
pub fn validate_independent_traces_agree() {
    let circuits: Vec<circuitry::Circuit> = (0..num_cpus::get())
        .into_par_iter()
        .map(|_| {
            let f = samples::equals_functional();
            f.circuit().expect("synthesis failed").clone()
        })
        .collect();
    log::info!("traced {} copies of equals_functional", circuits.len());
    for circuit in &circuits[1..] {
        assert_eq!(circuit, &circuits[0]);
    }
}
