//! Startup restore and periodic snapshots for a served store.

use docstore_core::{CoreResult, Store};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

/// Restore from `path` if it exists, otherwise start with an empty store.
pub fn load_store(path: &Path) -> CoreResult<Store> {
    if path.exists() {
        info!(path = %path.display(), "restoring snapshot");
        Store::from_file(path)
    } else {
        info!(path = %path.display(), "no snapshot found, starting empty");
        Ok(Store::new())
    }
}

/// Write a snapshot of `store` to `path` every `interval`.
///
/// The file is written to a sibling temporary path and renamed into place, so
/// a crash mid-write leaves the previous snapshot intact. Failures are logged
/// and retried on the next tick.
pub fn spawn_snapshotter(
    store: Arc<Store>,
    path: PathBuf,
    interval: Duration,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("docstore-snapshot".into())
        .spawn(move || loop {
            thread::sleep(interval);
            match write_snapshot(&store, &path) {
                Ok(()) => info!(path = %path.display(), "snapshot written"),
                Err(error) => warn!(path = %path.display(), %error, "snapshot failed"),
            }
        })
}

pub fn write_snapshot(store: &Store, path: &Path) -> CoreResult<()> {
    let tmp = path.with_extension("tmp");
    store.dump_to_file(&tmp)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
