use crate::codec::{read_request, write_response};
use crate::dispatch::dispatch;
use docstore_core::Store;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, trace, warn};

/// Accepts TCP connections and serves each one on its own thread against a
/// shared [`Store`].
pub struct Server {
    listener: TcpListener,
    store: Arc<Store>,
}

impl Server {
    pub fn bind(addr: impl ToSocketAddrs, store: Arc<Store>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, store })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. Accept failures are logged and skipped.
    pub fn run(self) -> io::Result<()> {
        info!("listening on {}", self.local_addr()?);
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(error) => {
                    warn!(%error, "accept failed");
                    continue;
                }
            };
            let store = Arc::clone(&self.store);
            let spawned = thread::Builder::new()
                .name("docstore-conn".into())
                .spawn(move || handle_connection(stream, &store));
            if let Err(error) = spawned {
                warn!(%error, "failed to spawn connection thread");
            }
        }
        Ok(())
    }
}

fn handle_connection(stream: TcpStream, store: &Store) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".into());
    info!(%peer, "connection opened");

    let result = stream
        .try_clone()
        .and_then(|read_half| serve(BufReader::new(read_half), BufWriter::new(stream), store));
    match result {
        Ok(()) => info!(%peer, "connection closed"),
        Err(error) => warn!(%peer, %error, "connection closed with error"),
    }
}

/// Request/response loop for one connection.
///
/// Idle until a line arrives, dispatch it, write the response, and go back to
/// idle. Ends cleanly at end of stream; any read, decode or write failure
/// ends the loop with that error.
pub fn serve<R, W>(mut reader: R, mut writer: W, store: &Store) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    loop {
        trace!("idle");
        let Some(request) = read_request(&mut reader)? else {
            debug!("peer closed the stream");
            return Ok(());
        };
        trace!(cmd = %request.cmd, "dispatching");
        let response = dispatch(store, request);
        write_response(&mut writer, &response)?;
    }
}
