//! The Producer (Receiver loop), spec.md §4.3.

use std::io;
use std::net::TcpStream;
use std::time::Instant;

use log::warn;

use crate::queue::{Queue, RequestMeta};
use crate::timing;
use crate::wire::{Request, Response};

/// Reads request frames off `stream` until the client disconnects,
/// admitting each into `queue` or rejecting it for overflow.
///
/// Runs on the Coordinator's own thread; returns once the client has
/// closed its end (or a non-retryable recv error occurred), at which point
/// the Coordinator is responsible for signaling the consumer and joining
/// it.
pub fn run(stream: &mut TcpStream, queue: &Queue) -> io::Result<()> {
    loop {
        let request = match Request::read_one(stream) {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        };

        let receipt = Instant::now();
        if queue.try_enqueue(RequestMeta::new(request, receipt)).is_err() {
            let reject = Instant::now();
            let resp = Response::rejected(request.req_id);
            if let Err(e) = resp.write_to(stream) {
                warn!("failed to send reject response for req {}: {e}", request.req_id);
            }
            println!(
                "X{}:{:.6},{:.6},{:.6}",
                request.req_id,
                request.req_timestamp.as_secs_f64(),
                request.req_length.as_secs_f64(),
                timing::elapsed_secs(reject),
            );
        }
    }
}
