pub mod cloudflare;
pub mod common;
pub mod config;
pub mod ip;
pub mod reconcile;

pub use crate::config::*;

#[cfg(test)]
mod testing;
