//! # tsactl
//!
//! Library behind the `tsactl` command line tool for the tinySA handheld
//! spectrum analyzer.
//!
//! ## Modules
//!
//! - [`utils`]: exact parsing and formatting of frequencies and durations
//! - [`device`]: the [`Device`](device::Device) capability trait, the
//!   instrument data model and the serial port transport
//! - [`commands`]: one module per CLI command, each turning flags into an
//!   ordered list of device operations
//! - [`config`]: connection/run options and the TOML config file
//! - [`output`]: JSON reports and text tables

pub mod commands;
pub mod config;
pub mod device;
pub mod output;
pub mod utils;

pub use commands::{Command, Outcome, Session};
pub use device::{Device, SerialDevice};
pub use utils::{
    QuantityError, format_frequency, format_time_duration, parse_frequency,
    parse_relative_frequency, parse_time_duration,
};
