use std::fmt;

/// Errors raised by the request-processing core.
///
/// Transport-level conditions (client disconnect, recv/send failures) are
/// represented as plain [`std::io::Error`] at the call site instead of being
/// folded in here, since they are local control flow rather than failures of
/// the core itself.
#[derive(Debug)]
pub enum Error {
    /// The bounded queue was at capacity when an enqueue was attempted.
    QueueFull,
    /// A queue was constructed with `capacity == 0`.
    ZeroCapacity,
    /// A `{seconds, nanoseconds}` pair had a negative component or
    /// `nanoseconds >= 1_000_000_000`.
    InvalidDuration,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::QueueFull => write!(f, "queue is at capacity"),
            Error::ZeroCapacity => write!(f, "queue capacity must be non-zero"),
            Error::InvalidDuration => {
                write!(f, "duration has a negative or out-of-range component")
            }
        }
    }
}

impl std::error::Error for Error {}
