//! Mock gateway for development and testing
//!
//! Accepts one configured code, optionally simulates latency and failures,
//! and counts calls. Nothing leaves the process.

mod mock_gateway;

pub use mock_gateway::MockOtpGateway;
