//! Unit tests for value objects

mod state_tests;
