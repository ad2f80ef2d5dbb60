//! Integration test crate for dirmirror
//!
//! This crate holds no library code; the end-to-end scenarios live in
//! `tests/integration_tests.rs`.
