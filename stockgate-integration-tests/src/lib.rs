//! Integration tests for `StockGate`
//!
//! This crate contains integration tests that verify the admission-control
//! properties across the core crate and the in-memory adapters: no
//! overselling under concurrency, rate-window bounds, rollback behavior,
//! asynchronous persistence, and reconciliation.

// This is a test-only crate
#![cfg(test)]
