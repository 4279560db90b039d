//! Entry point for `stop-and-wait`.
//!
//! Parses CLI arguments and dispatches into either **server** or **client** mode.
//! All actual protocol work is delegated to library modules; `main.rs` owns only
//! process setup (logging, argument parsing, exit status).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use stop_and_wait::config::{self, LossRatio, ReceiverConfig, SenderConfig};
use stop_and_wait::session;
use stop_and_wait::source::Chunking;

/// Stop-and-wait file transfer over UDP.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Serve one file request, then exit.
    Server {
        /// ACK timeout exponent e: the wait is derived from 10^e microseconds.
        timeout_exponent: u32,
        /// Probability (0-1) that a data packet transmission is dropped.
        packet_loss: LossRatio,
        /// Local address to bind.
        #[arg(short, long, default_value_t = config::default_bind_addr())]
        bind: SocketAddr,
        /// Directory requested names are resolved against.
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// How the file is cut into packets: `lines` or `fixed`.
        #[arg(short, long, default_value_t = Chunking::Lines)]
        chunking: Chunking,
    },
    /// Request a file from a server and save it locally.
    Client {
        /// Name of the file to retrieve from the server.
        file_name: String,
        /// Probability (0-1) that an ACK transmission is dropped.
        ack_loss: LossRatio,
        /// Server address as host:port.
        #[arg(short, long, default_value_t = format!("{}:{}", config::DEFAULT_SERVER_HOST, config::DEFAULT_PORT))]
        server: String,
        /// Where delivered bytes are written.
        #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
        output: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()).await {
        log::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.mode {
        Mode::Server {
            timeout_exponent,
            packet_loss,
            bind,
            root,
            chunking,
        } => {
            let config = SenderConfig::new(timeout_exponent, packet_loss)
                .context("invalid server parameters")?
                .with_chunking(chunking);
            if config.timeout.duration().is_none() {
                log::warn!(
                    "timeout exponent {} yields a zero wait; ACK waits will never expire",
                    config.timeout.exponent()
                );
            }
            log::info!(
                "Starting server with timeout exponent {}, packet loss ratio {}",
                config.timeout.exponent(),
                config.packet_loss
            );
            let stats = session::serve(bind, &root, &config)
                .await
                .context("server session failed")?;
            println!("\n{stats}");
        }
        Mode::Client {
            file_name,
            ack_loss,
            server,
            output,
        } => {
            let config = ReceiverConfig::new(file_name, ack_loss);
            let stats = session::request(&server, &config, &output)
                .await
                .context("client session failed")?;
            println!("\n{stats}");
        }
    }
    Ok(())
}
