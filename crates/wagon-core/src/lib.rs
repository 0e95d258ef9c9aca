//! # wagon-core
//!
//! Core types, traits, configuration, and error handling for the Wagon
//! WhatsApp marketing backend.

pub mod config;
pub mod error;
pub mod phone;
pub mod template;
pub mod traits;
pub mod types;

pub use config::shellexpand;
