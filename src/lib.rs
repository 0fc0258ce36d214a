//! TVO coordinator - anonymous pairing backend
//!
//! Brokers two kinds of anonymous sessions over a single `WebSocket`:
//! - Video/chat pairings, with text relay and "next partner"
//! - Chess games, with server-side move validation
//!
//! A periodic reaper removes sessions whose transport vanished.

pub mod chess;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod reaper;
pub mod routes;
pub mod state;
pub mod utils;
