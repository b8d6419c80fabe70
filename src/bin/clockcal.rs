use anyhow::{anyhow, Result};
use clap::Parser;

use fifo_reqsrv::timing;
use fifo_reqsrv::wire::Timespec;

/// Measures host clock speed by timing a wait of a given duration against
/// the host cycle counter.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    seconds: i64,
    nanoseconds: i64,

    /// Wait method: `s` for sleep-based, `b` for busy-waiting.
    #[arg(value_parser = ["s", "b"])]
    method: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let duration = Timespec::new(args.seconds, args.nanoseconds)
        .to_duration()
        .map_err(|_| anyhow!("invalid duration"))?;

    let (label, cycles) = match args.method.as_str() {
        "s" => ("SLEEP", timing::sleep_wait(duration)),
        "b" => ("BUSYWAIT", timing::busy_wait(duration)),
        _ => unreachable!("clap restricts method to s/b"),
    };

    let wait_time_seconds = duration.as_secs_f64();
    let clock_speed_mhz = cycles as f64 / wait_time_seconds / 1e6;

    println!(
        "WaitMethod: {label} WaitTime: {} {} ClocksElapsed: {cycles} ClockSpeed: {:.2}",
        args.seconds, args.nanoseconds, clock_speed_mhz
    );

    Ok(())
}
