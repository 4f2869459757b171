//! Services layer (ports + adapters).
//!
//! - `ports`: the data-service contract and configuration types (kernel-facing).
//! - `adapters`: HTTP, filesystem and async runtime implementations.

pub mod adapters;
pub mod ports;
