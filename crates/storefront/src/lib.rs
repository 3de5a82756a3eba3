//! Shoestring Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused. The binary in `main.rs` only
//! wires configuration, the database pool, and the router together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod routes;
pub mod services;
pub mod state;
