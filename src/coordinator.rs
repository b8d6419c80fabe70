//! The connection-scoped Coordinator, spec.md §4.5.

use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use log::{error, info};

use crate::config::ConnectionParams;
use crate::producer;
use crate::queue::Queue;

/// Drives one accepted connection end to end: allocates the queue, spawns
/// the consumer, runs the producer inline, and tears everything down in
/// order once the client disconnects.
///
/// Returns only after the worker thread has been joined and the socket has
/// been shut down.
pub fn handle_connection(mut stream: TcpStream, params: ConnectionParams) -> io::Result<()> {
    let queue = Arc::new(Queue::new(params.queue_size).expect("queue_size validated by caller"));

    let worker_stream = stream.try_clone()?;
    let worker_queue = queue.clone();
    let worker = match std::thread::Builder::new()
        .name("worker".into())
        .spawn(move || crate::consumer::run(&worker_queue, worker_stream))
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("unable to create worker thread: {e}");
            let _ = stream.shutdown(Shutdown::Both);
            return Err(e);
        }
    };
    info!("worker thread started");

    let producer_result = producer::run(&mut stream, &queue);

    info!("asserting termination flag for worker thread");
    queue.shutdown();

    if worker.join().is_err() {
        error!("worker thread panicked");
    }
    info!("worker thread exited");

    stream.shutdown(Shutdown::Both).ok();
    info!("client disconnected");

    producer_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Request, Response, Timespec};
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn send_request(client: &mut TcpStream, id: u64, secs: i64, nanos: i64) {
        let req = Request {
            req_id: id,
            req_timestamp: Timespec::new(0, 0),
            req_length: Timespec::new(secs, nanos),
        };
        client.write_all(&req.to_bytes()).unwrap();
    }

    fn read_response(client: &mut TcpStream) -> Response {
        let mut buf = [0u8; Response::WIRE_LEN];
        client.read_exact(&mut buf).unwrap();
        Response {
            req_id: u64::from_le_bytes(buf[0..8].try_into().unwrap()),
            ack: buf[8],
        }
    }

    #[test]
    fn single_request_accepted_end_to_end() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client_thread = std::thread::spawn(move || {
            let mut client = TcpStream::connect(addr).unwrap();
            send_request(&mut client, 7, 0, 10_000_000);
            let resp = read_response(&mut client);
            drop(client.shutdown(Shutdown::Both));
            resp
        });

        let (server_stream, _) = listener.accept().unwrap();
        handle_connection(server_stream, ConnectionParams::new(2)).unwrap();

        let resp = client_thread.join().unwrap();
        assert_eq!(resp.req_id, 7);
        assert_eq!(resp.ack, 0);
    }

    #[test]
    fn overflow_reject_arrives_before_earlier_completions() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client_thread = std::thread::spawn(move || {
            let mut client = TcpStream::connect(addr).unwrap();
            send_request(&mut client, 1, 0, 30_000_000);
            // Give the worker a chance to dequeue request 1 (and start
            // busy-waiting on it) before the queue is probed again, so
            // request 2 lands in the now-empty, capacity-1 queue instead of
            // racing the worker for the same slot.
            std::thread::sleep(std::time::Duration::from_millis(10));
            send_request(&mut client, 2, 0, 30_000_000);
            send_request(&mut client, 3, 0, 30_000_000);
            drop(client.shutdown(Shutdown::Write));
            let mut responses = Vec::new();
            loop {
                let mut buf = [0u8; Response::WIRE_LEN];
                match client.read_exact(&mut buf) {
                    Ok(()) => responses.push(Response {
                        req_id: u64::from_le_bytes(buf[0..8].try_into().unwrap()),
                        ack: buf[8],
                    }),
                    Err(_) => break,
                }
            }
            responses
        });

        let (server_stream, _) = listener.accept().unwrap();
        handle_connection(server_stream, ConnectionParams::new(1)).unwrap();

        let responses = client_thread.join().unwrap();
        assert_eq!(responses.len(), 3);
        let ack_of = |id: u64| responses.iter().find(|r| r.req_id == id).unwrap().ack;
        assert_eq!(ack_of(1), 0);
        assert_eq!(ack_of(2), 0);
        assert_eq!(ack_of(3), 1);
    }

    #[test]
    fn fifo_order_under_burst() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client_thread = std::thread::spawn(move || {
            let mut client = TcpStream::connect(addr).unwrap();
            for id in 1..=50u64 {
                send_request(&mut client, id, 0, 1_000_000);
            }
            drop(client.shutdown(Shutdown::Write));
            let mut order = Vec::new();
            loop {
                let mut buf = [0u8; Response::WIRE_LEN];
                match client.read_exact(&mut buf) {
                    Ok(()) => order.push(u64::from_le_bytes(buf[0..8].try_into().unwrap())),
                    Err(_) => break,
                }
            }
            order
        });

        let (server_stream, _) = listener.accept().unwrap();
        handle_connection(server_stream, ConnectionParams::new(100)).unwrap();

        let order = client_thread.join().unwrap();
        let expected: Vec<u64> = (1..=50).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn orderly_shutdown_after_single_request() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client_thread = std::thread::spawn(move || {
            let mut client = TcpStream::connect(addr).unwrap();
            send_request(&mut client, 1, 0, 100_000_000);
            let resp = read_response(&mut client);
            drop(client.shutdown(Shutdown::Both));
            resp
        });

        let (server_stream, _) = listener.accept().unwrap();
        handle_connection(server_stream, ConnectionParams::new(4)).unwrap();
        let resp = client_thread.join().unwrap();
        assert_eq!(resp, Response::completed(1));
    }
}
