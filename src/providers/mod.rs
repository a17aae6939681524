//! Protocol provider implementations.

pub mod email;
