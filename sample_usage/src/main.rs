// SPDX-License-Identifier: Apache-2.0

mod multithread;

use circuitry::gate::Shape;
use circuitry::synthesize::{synthesize, Signal, Signature, Value};

/// Synthesizes a majority-of-three function and checks that the circuit agrees
/// with running the function directly.
fn validate_majority() -> Result<(), Box<dyn std::error::Error>> {
    let majority = synthesize(
        "majority",
        Signature::new()
            .input("x", Shape::Bit)
            .input("y", Shape::Bit)
            .input("z", Shape::Bit)
            .output("m", Shape::Bit),
        |cx, args| {
            let (x, y, z) = (args[0].as_bit()?, args[1].as_bit()?, args[2].as_bit()?);
            let xy = x.and(cx, y)?;
            let xz = x.and(cx, z)?;
            let yz = y.and(cx, z)?;
            let m = xy.or(cx, xz)?.or(cx, yz)?;
            Ok(vec![Signal::Bit(m)])
        },
    )?;
    log::info!("{}", majority.circuit()?);

    for bits in 0..8u8 {
        let args: Vec<Value> = (0..3).map(|i| Value::Bit((bits >> i) & 1 == 1)).collect();
        let want = majority.call(&args)?;
        let got = majority.evaluate(&args)?;
        assert_eq!(got, want);
        assert_eq!(got, vec![Value::Bit(bits.count_ones() >= 2)]);
    }
    Ok(())
}

fn main() {
    let _ = env_logger::try_init();
    let result = validate_majority();
    println!("majority validation result: {:?}", result);
    multithread::validate_all_threads_compute_add32();
    multithread::validate_independent_traces_agree();
    println!("multithreaded validation done");
}

#[test]
fn test_validate_majority() {
    let _ = env_logger::try_init();
    validate_majority().expect("validation should succeed");
}
