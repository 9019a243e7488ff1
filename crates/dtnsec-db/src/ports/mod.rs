//! # Ports Layer
//!
//! Trait definitions for the inbound API and outbound SPI.

pub mod inbound;
pub mod outbound;
