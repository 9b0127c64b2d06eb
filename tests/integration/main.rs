//! Integration test driver for `tests/integration/`.
//!
//! Each `mod` below exercises one layer against the in-memory transport
//! from `mock_transport`. No broker or network is needed.

mod mock_transport;
mod status_sync_tests;
mod voice_tests;
