//! Model gateway implementations.
//!
//! This module provides reference implementations of the `ModelGateway`
//! trait. Users can use these directly or implement their own.

#[cfg(feature = "openrouter")]
mod openrouter;

#[cfg(feature = "openrouter")]
pub use openrouter::OpenRouterGateway;
