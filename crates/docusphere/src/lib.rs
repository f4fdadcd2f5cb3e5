// Library root: re-exports all modules so integration tests and the binary
// can reach the crate's public API.

pub mod api;
pub mod app;
pub mod config;
pub mod listing;
pub mod models;
pub mod protocol;
pub mod qna;
pub mod session;
pub mod store;
pub mod tui;
pub mod upload;
