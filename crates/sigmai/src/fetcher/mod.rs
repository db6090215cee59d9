//! Retrieves MISP events and enriches each with its objects and
//! attributes via a small worker pool.

mod client;
mod pool;

pub use client::MispClient;
pub use pool::{spawn, FetcherHandle};
