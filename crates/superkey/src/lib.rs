//! SuperKey worker commands
//!
//! The binary wires these handlers to a [`superkey_core::ProviderRegistry`]
//! backed by real cloud clients.

pub mod commands;
