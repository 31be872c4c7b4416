//! Unit tests for domain entities

mod context_tests;
