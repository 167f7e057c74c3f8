//! Inventory of the Python wheels available in a wheelhouse
//!
//! Wheel filenames are parsed into records, filtered against name and version
//! queries and the interpreters and architectures of interest, then reported.

pub mod config;
pub mod parser;
pub mod query;
pub mod report;
pub mod scanner;
pub mod version;
