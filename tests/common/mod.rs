//! Common test utilities for all integration tests.
//!
//! Provides fixtures for deployments, services wired to an in-memory vault,
//! and a vault double that panics for selected user names.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod fixtures;
