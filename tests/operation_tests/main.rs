//! Operation tests
//!
//! The write executor and the acknowledgment sub-protocol, driven
//! through a scripted mock connection with buffer-pool accounting.

mod acknowledge_tests;
