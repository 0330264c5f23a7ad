//! Checksum a buffer for a couple of seconds and print the throughput.
//!
//! Run with `RUST_LOG=debug cargo run --example throughput` to see the
//! deadline lifecycle.

use std::time::Duration;

use deadline_bench::output::{format_report, to_json_pretty};
use deadline_bench::{black_box, Config, Session};
use tracing_subscriber::EnvFilter;

fn checksum(buf: &[u8]) -> u32 {
    buf.iter()
        .fold(0u32, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let buf = vec![0xA5u8; 16 * 1024];
    let mut session = Session::with_config(Config::default().timeout(Duration::from_secs(2)));

    println!("Checksumming {} byte blocks for 2 secs", buf.len());
    let report = session.run(|| {
        black_box(checksum(black_box(&buf)));
        buf.len() as u64
    })?;

    print!("{}", format_report(&report));
    println!("{}", to_json_pretty(&report)?);
    Ok(())
}
