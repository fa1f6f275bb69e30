use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a document store over TCP.
    Serve(ServeArgs),
    /// Connect to a server and issue commands interactively.
    Client(ClientArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Socket address to bind. Use port 0 for an ephemeral port.
    #[arg(long, env = "DOCSTORE_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Snapshot file restored at startup and rewritten periodically.
    #[arg(long, env = "DOCSTORE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Seconds between snapshot writes.
    #[arg(long, env = "DOCSTORE_SNAPSHOT_INTERVAL", default_value_t = 60)]
    pub snapshot_interval: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Address of the server to connect to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub server: SocketAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_args() {
        let cli = Cli::try_parse_from([
            "docstore",
            "serve",
            "--listen",
            "0.0.0.0:9000",
            "--snapshot",
            "/tmp/store.json",
            "--snapshot-interval",
            "5",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.listen.port(), 9000);
        assert_eq!(args.snapshot, Some(PathBuf::from("/tmp/store.json")));
        assert_eq!(args.snapshot_interval, 5);
    }

    #[test]
    fn parse_client_defaults() {
        let cli = Cli::try_parse_from(["docstore", "client"]).unwrap();
        let Command::Client(args) = cli.command else {
            panic!("expected client");
        };
        assert_eq!(args.server.to_string(), "127.0.0.1:8080");
    }
}
