//! The Consumer (Worker loop), spec.md §4.4.

use std::net::TcpStream;
use std::time::Instant;

use log::warn;

use crate::queue::Queue;
use crate::timing::{self, busy_wait};
use crate::wire::Response;

/// Pulls requests off `queue` in FIFO order, busy-waits for the declared
/// service duration, and responds with a completion ack.
///
/// Exits when [`Queue::dequeue`] returns `None`, i.e. once the Coordinator
/// has signaled shutdown and nothing is left to drain.
pub fn run(queue: &Queue, mut stream: TcpStream) {
    println!("[#WORKER#] {:.6} Worker Thread Alive!", timing::elapsed_secs(Instant::now()));

    while let Some(mut meta) = queue.dequeue() {
        meta.start = Some(Instant::now());

        match meta.request.req_length.to_duration() {
            Ok(duration) => {
                busy_wait(duration);
            }
            Err(_) => {
                warn!(
                    "req {} has a malformed service duration ({}, {}); skipping the wait",
                    meta.request.req_id,
                    meta.request.req_length.seconds,
                    meta.request.req_length.nanoseconds,
                );
            }
        }

        meta.completion = Some(Instant::now());

        let resp = Response::completed(meta.request.req_id);
        if let Err(e) = resp.write_to(&mut stream) {
            warn!("failed to send completion response for req {}: {e}", meta.request.req_id);
        }

        println!(
            "R{}:{:.6},{:.6},{:.6},{:.6},{:.6}",
            meta.request.req_id,
            meta.request.req_timestamp.as_secs_f64(),
            meta.request.req_length.as_secs_f64(),
            timing::elapsed_secs(meta.receipt),
            timing::elapsed_secs(meta.start.unwrap()),
            timing::elapsed_secs(meta.completion.unwrap()),
        );

        let ids = queue.snapshot_ids();
        let rendered: Vec<String> = ids.iter().map(|id| format!("R{id}")).collect();
        println!("Q:[{}]", rendered.join(","));
    }
}
