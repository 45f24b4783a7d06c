//! Configuration types.
//!
//! Option structs consumed by the library, plus the TOML config file that
//! provides defaults for them.

pub mod connection;
pub mod file;
pub mod run;

pub use connection::ConnectOptions;
pub use file::FileConfig;
pub use run::{DEFAULT_CAPTURE_TEMPLATE, DEFAULT_TRACE_TEMPLATE, DEFAULT_TRACES_TEMPLATE, RunOptions};
