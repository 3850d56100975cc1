//! End-to-end tests for the MCU bridge.
//!
//! These tests run the real registry, initializer, bridge loop and websocket
//! transport. Serial hardware is replaced by in-memory mock ports.

pub mod file_tests;
pub mod routing_tests;
pub mod session_tests;
