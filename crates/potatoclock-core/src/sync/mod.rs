//! Keeping displays and the state holder in step.
//!
//! The state holder owns the session behind a [`SessionHandle`]; displays talk
//! to it over HTTP/JSON with [`SyncClient`] and order what they read with a
//! [`SnapshotPoller`].

mod client;
mod handle;
mod poller;
pub mod wire;

pub use client::SyncClient;
pub use handle::SessionHandle;
pub use poller::{PollUpdate, SnapshotPoller};
pub use wire::StateResponse;
