//! End-to-end provider tests against a mock OpenVPN Cloud API

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

mod common;
mod data_sources_test;
mod network_test;
mod resources_test;
