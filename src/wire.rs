//! Fixed-size frames exchanged on the wire (spec.md §6.1).
//!
//! Layout is little-endian with no byte-order conversion beyond picking that
//! one fixed endianness, matching a natural `#[repr(C)]` layout on the
//! reference x86_64 host. Cross-architecture interoperability is
//! unspecified, per spec.md §9.

use std::io::{self, Read, Write};

use crate::error::Error;

/// `{seconds, nanoseconds}`, as carried by both `req_timestamp` and
/// `req_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timespec {
    pub seconds: i64,
    pub nanoseconds: i64,
}

impl Timespec {
    pub const fn new(seconds: i64, nanoseconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Seconds-with-fraction, for the log lines in spec.md §6.3.
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.nanoseconds as f64 / 1_000_000_000.0
    }

    /// Validates and converts to a `Duration`. Negative components or
    /// `nanoseconds >= 1_000_000_000` are a programming error per spec.md
    /// §4.1.
    pub fn to_duration(&self) -> Result<std::time::Duration, Error> {
        if self.seconds < 0 || self.nanoseconds < 0 || self.nanoseconds >= 1_000_000_000 {
            return Err(Error::InvalidDuration);
        }
        Ok(std::time::Duration::new(
            self.seconds as u64,
            self.nanoseconds as u32,
        ))
    }

    fn write_to(&self, buf: &mut [u8]) {
        buf[0..8].copy_from_slice(&self.seconds.to_le_bytes());
        buf[8..16].copy_from_slice(&self.nanoseconds.to_le_bytes());
    }

    fn read_from(buf: &[u8]) -> Self {
        Self {
            seconds: i64::from_le_bytes(buf[0..8].try_into().unwrap()),
            nanoseconds: i64::from_le_bytes(buf[8..16].try_into().unwrap()),
        }
    }
}

/// On-wire request frame: `req_id`, `req_timestamp`, `req_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub req_id: u64,
    pub req_timestamp: Timespec,
    pub req_length: Timespec,
}

impl Request {
    pub const WIRE_LEN: usize = 40;

    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut buf = [0u8; Self::WIRE_LEN];
        buf[0..8].copy_from_slice(&self.req_id.to_le_bytes());
        self.req_timestamp.write_to(&mut buf[8..24]);
        self.req_length.write_to(&mut buf[24..40]);
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::WIRE_LEN]) -> Self {
        Self {
            req_id: u64::from_le_bytes(buf[0..8].try_into().unwrap()),
            req_timestamp: Timespec::read_from(&buf[8..24]),
            req_length: Timespec::read_from(&buf[24..40]),
        }
    }

    /// Reads exactly one request frame from `r`. Returns `Ok(None)` on a
    /// clean EOF (zero bytes read before the frame starts), which the
    /// producer treats as client disconnect. A short read that stops
    /// partway through a frame surfaces as an `UnexpectedEof` error and is
    /// likewise treated as connection-terminating (spec.md §4.3).
    pub fn read_one<R: Read>(r: &mut R) -> io::Result<Option<Self>> {
        let mut buf = [0u8; Self::WIRE_LEN];
        let mut filled = 0;
        loop {
            match r.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed mid-frame",
                    ))
                }
                Ok(n) => {
                    filled += n;
                    if filled == Self::WIRE_LEN {
                        return Ok(Some(Self::from_bytes(&buf)));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// On-wire response frame: `req_id`, `ack` (0 = completed, 1 = rejected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub req_id: u64,
    pub ack: u8,
}

impl Response {
    pub const WIRE_LEN: usize = 9;

    pub const fn completed(req_id: u64) -> Self {
        Self { req_id, ack: 0 }
    }

    pub const fn rejected(req_id: u64) -> Self {
        Self { req_id, ack: 1 }
    }

    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut buf = [0u8; Self::WIRE_LEN];
        buf[0..8].copy_from_slice(&self.req_id.to_le_bytes());
        buf[8] = self.ack;
        buf
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }
}
