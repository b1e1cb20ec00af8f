//! Krisha Core - Shared types library.
//!
//! This crate provides the domain types used across the Krisha components:
//! - `storefront` - Client-side cart and wishlist engine
//! - `cli` - Command-line front end over the engine
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! network, no persistence. The serialized shape of every type here is the
//! shape written to durable storage and exchanged with the wishlist service.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, cart lines, and wishlist entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
