//! Lichess Opening Explorer integration

mod client;
mod types;

pub use client::ExplorerClient;
pub use types::*;
