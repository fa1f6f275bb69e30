//! Network front end for `docstore_core`.
//!
//! - [`protocol`] defines request/response messages and validates requests
//!   into typed commands.
//! - [`codec`] frames messages as newline-delimited JSON.
//! - [`dispatch`] routes commands to the store.
//! - [`server`] accepts TCP connections, one thread per connection.
//! - [`client`] is the interactive command-line client.
//! - [`persistence`] restores and periodically snapshots a served store.

pub mod cli;
pub mod client;
pub mod codec;
pub mod dispatch;
pub mod persistence;
pub mod protocol;
pub mod server;

pub use client::Client;
pub use dispatch::dispatch;
pub use protocol::{Command, Request, Response};
pub use server::Server;
