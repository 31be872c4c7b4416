//! Unit tests for the verification machine


mod transition_tests;
