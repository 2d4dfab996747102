//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small support site and drive full
//! runs end-to-end through the HTTP fetch gate, the checkpoint database and
//! the JSONL dataset.

mod common;
mod harvest_tests;
mod resume_tests;
