//! Sigpost Client - signal submission over HTTP
//!
//! This crate is the network collaborator around the pure core:
//! - Basic-auth token exchange with cached bearer reuse
//! - Single-signal JSON submission
//! - Zip-bundle submission as multipart form data
//! - Directory loading of `.json`/`.zip` signal files

pub mod communication;
pub mod loader;

pub use communication::*;
pub use loader::*;
