//! Covgen: coverage-driven unit test scaffolding.
//!
//! Generates boilerplate test files for a Vue/TypeScript codebase from a
//! manifest of source paths, drives an external test runner to measure
//! coverage, and can ask a hosted language model to rewrite tests that fail
//! or fall short of the coverage threshold.

pub mod batch;
pub mod config;
pub mod error;
pub mod manifest;
pub mod repair;
pub mod report;
pub mod resolve;
pub mod runner;
pub mod template;
