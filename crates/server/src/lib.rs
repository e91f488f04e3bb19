//! Cartload server library.
//!
//! This crate provides the order-commerce backend as a library, allowing it
//! to be tested and reused. The binary in `main.rs` wires it to a socket.
//!
//! # Architecture
//!
//! - `db` - repositories: typed query functions over an injected executor
//! - `services` - cart, order, and checkout orchestration; owns transactions
//! - `payments` - external payment processor client and webhook verification
//! - `routes` - JSON API handlers
//!
//! Identity arrives on requests already authenticated by the edge proxy
//! (`x-user-id` header); this service performs no session management.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
