//! Core types for Krisha.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod wishlist;

pub use cart::{CartItem, CartItemInput};
pub use id::*;
pub use price::{Price, PriceError};
pub use wishlist::{ProductSnapshot, WishlistEntry};
