//! Property-based tests for the extension engine.
//!
//! Random small lattices are extended under random limits and every outcome
//! is checked for uniqueness, legal insertion, append-only growth, the
//! magnitude bound and honest termination status.

mod invariants;
mod strategies;
mod tests;
