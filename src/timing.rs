//! Precise wait primitives (spec.md §4.1) and the server's printable
//! monotonic-clock domain.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// The server's monotonic-clock domain, printed as seconds-with-fraction in
/// the protocol log lines (spec.md §6.3). The origin is an arbitrary point
/// fixed at first use, the same relationship `CLOCK_MONOTONIC` has to an
/// arbitrary kernel-chosen epoch: only differences between readings are
/// meaningful.
pub fn now() -> Duration {
    Instant::now().duration_since(*ORIGIN.get_or_init(Instant::now))
}

/// Forces the monotonic origin to be fixed now, so every later [`Instant`]
/// captured by the producer or consumer converts to a consistent timeline
/// via [`elapsed_secs`]. Call once, before accepting a connection.
pub fn init() {
    ORIGIN.get_or_init(Instant::now);
}

/// Converts an [`Instant`] captured elsewhere into seconds-with-fraction in
/// this process's monotonic-clock domain, for the log lines in spec.md
/// §6.3.
pub fn elapsed_secs(instant: Instant) -> f64 {
    instant
        .duration_since(*ORIGIN.get_or_init(Instant::now))
        .as_secs_f64()
}

#[cfg(target_arch = "x86_64")]
fn read_cycles() -> u64 {
    // SAFETY: RDTSC has no preconditions; it is always safe to execute on
    // x86_64.
    unsafe { core::arch::x86_64::_rdtsc() }
}

#[cfg(not(target_arch = "x86_64"))]
fn read_cycles() -> u64 {
    // No portable cycle counter; fall back to a nanosecond-derived tick so
    // callers still get a monotonically increasing count. `clockcal`'s
    // reported clock speed is meaningless off x86_64 as a result.
    now().as_nanos() as u64
}

/// Blocks the caller for at least `duration` using the OS suspending timer.
/// Returns the number of host cycle-counter ticks elapsed across the sleep.
pub fn sleep_wait(duration: Duration) -> u64 {
    let before = read_cycles();
    std::thread::sleep(duration);
    read_cycles().wrapping_sub(before)
}

/// Spins until at least `duration` has elapsed, without yielding the core.
/// Returns the number of host cycle-counter ticks elapsed across the spin.
pub fn busy_wait(duration: Duration) -> u64 {
    let before = read_cycles();
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
    read_cycles().wrapping_sub(before)
}
