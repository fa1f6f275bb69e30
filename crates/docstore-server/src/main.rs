use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use docstore_core::Store;

use docstore_server::{
    cli::{Cli, Command, ServeArgs},
    client, persistence, Server,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn serve(args: ServeArgs) -> Result<()> {
    let store = match &args.snapshot {
        Some(path) => persistence::load_store(path)
            .with_context(|| format!("failed to restore snapshot {}", path.display()))?,
        None => Store::new(),
    };
    let store = Arc::new(store);

    if let Some(path) = args.snapshot.clone() {
        let interval = Duration::from_secs(args.snapshot_interval.max(1));
        persistence::spawn_snapshotter(Arc::clone(&store), path, interval)
            .context("failed to start snapshot thread")?;
    }

    let server = Server::bind(args.listen, store)
        .with_context(|| format!("failed to bind {}", args.listen))?;
    server.run()?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Client(args) => client::run(args),
    }
}
