#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! docindex-core
//!
//! Shared domain types, configuration, corpus scanning and chunking for the
//! local documentation index.

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod docs;
pub mod error;
pub mod fingerprint;
pub mod scanner;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
