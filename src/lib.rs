//! # Fault Demo
//!
//! A catalogue of small scenarios, each triggering one specific runtime fault
//! and containing it at its own boundary so the rest of the catalogue keeps going.
//!
//! ## Scenarios
//!
//! 1. **read-missing-file** / **open-missing-file** - `ResourceNotFound`
//! 2. **read-past-end** - `EndOfStream` after reading every record
//! 3. **connect-unreachable-database** - `ConnectionFailure`
//! 4. **load-unknown-type** - `LookupFailure`
//! 5. **divide-by-zero** - `InvalidArithmetic`
//! 6. **dereference-absent-value** - `NullReference`
//! 7. **index-out-of-range** - `BoundsViolation`
//! 8. **invalid-type-cast** - `TypeMismatch`
//! 9. **invalid-argument** - `InvalidArgument`
//! 10. **malformed-numeric-parse** - `ParseFailure`
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin fault_demo
//! RUST_LOG=fault_demo=debug cargo run --bin fault_demo
//! ```
//!
//! ## Key Dependencies
//!
//! - `thiserror` - fault and config error types
//! - `rusqlite` - the database the connection scenario fails to open
//! - `serde` / `toml` / `serde_json` - config file and report output
//! - `tracing` - per-scenario diagnostics

pub mod config;
pub mod dynamic;
pub mod fault;
pub mod outcome;
pub mod records;
pub mod runner;
pub mod scenarios;

pub use config::DemoConfig;
pub use fault::{Fault, FaultKind};
pub use outcome::{Outcome, Report};
pub use runner::{Catalogue, CatalogueBuilder, CatalogueError, Runner, Scenario};
