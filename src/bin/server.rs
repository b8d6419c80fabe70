use std::net::TcpListener;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use fifo_reqsrv::config::ConnectionParams;
use fifo_reqsrv::{coordinator, timing};

/// Bounded-queue FIFO request service server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Maximum number of requests admitted to the queue at once.
    #[arg(short = 'q', long = "queue-size")]
    queue_size: usize,

    /// TCP port to bind the server to.
    port: u16,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.queue_size == 0 {
        bail!("Invalid queue size");
    }
    if args.port == 0 {
        bail!("Invalid port number");
    }

    let params = ConnectionParams::new(args.queue_size);

    timing::init();

    let listener =
        TcpListener::bind(("0.0.0.0", args.port)).context("unable to bind socket")?;

    info!("waiting for incoming connection...");
    let (stream, peer) = listener.accept().context("unable to accept connections")?;
    info!("accepted connection from {peer}");

    coordinator::handle_connection(stream, params).context("connection handling failed")?;

    Ok(())
}
