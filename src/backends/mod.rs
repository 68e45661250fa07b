//! Implementations of [`VirusTotalApi`](crate::core::VirusTotalApi).
//!
//! - [`virustotal`] - The HTTP client for the real service
//! - [`mock`] - An in-memory backend for tests

pub mod mock;
pub mod virustotal;

pub use mock::MockVirusTotal;
pub use virustotal::{VirusTotalClient, VirusTotalConfig};
