//! Shared test utilities

#![allow(dead_code)]

pub mod wheelhouse;

pub use wheelhouse::{TEST_WHEELHOUSE, create_test_wheelhouse, load_corpus, write_file};
