//! # tsactl
//!
//! A command line tool for the tinySA handheld spectrum analyzer.
//!
//! Each subcommand maps its flags onto the instrument's USB serial shell:
//! sweep range and timing, markers, traces, display levels, presets, screen
//! captures and CSV export of measured traces.
//!
//! ## Usage
//!
//! ```bash
//! # Show the current sweep
//! tsactl sweep
//!
//! # Sweep 100 MHz to 200 MHz with 450 points
//! tsactl sweep --start 100M --stop 200M --points 450
//!
//! # Move the stop frequency 10 MHz up
//! tsactl sweep --stop +10M
//!
//! # Put marker 1 on the peak and list markers
//! tsactl marker 1 --peak
//! tsactl marker
//!
//! # Export traces 1 and 2 to a single CSV file
//! tsactl save -t 1 -t 2
//!
//! # Save the screen as PNG
//! tsactl save -c -o screen.png
//! ```

mod cli;

use std::io::{self, Write};
use std::process::exit;

use anyhow::{Result, bail};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use tsactl::commands::{Command, Outcome, Session};
use tsactl::config::{
    ConnectOptions, DEFAULT_CAPTURE_TEMPLATE, DEFAULT_TRACE_TEMPLATE, DEFAULT_TRACES_TEMPLATE,
    FileConfig, RunOptions,
};
use tsactl::config::connection::{DEFAULT_BAUDRATE, DEFAULT_TIMEOUT};
use tsactl::device::{Device, SerialDevice};

use cli::{Cli, Commands, ConfigCommand};

/// Entry point for the tsactl application.
///
/// This function handles all errors gracefully by calling [`inner_main`] and printing
/// any errors to stderr before exiting with a non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("{} {err:#}", "Error:".red());

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// Parses arguments, layers the config file underneath them, and runs the
/// selected command against a lazily opened serial connection.
///
/// # Errors
///
/// Returns errors from opening the serial port, from any device operation,
/// or from writing output and export files.
fn inner_main() -> Result<()> {
    let args = Cli::parse();

    if let Commands::Config { command } = &args.command {
        return handle_config_command(*command);
    }

    let file_config = load_config(args.json());
    let connect_options = args.connect_options(&file_config);
    let run_options = args.run_options(&file_config);

    let mut session = Session::new(Box::new(move || -> Result<Box<dyn Device>> {
        Ok(Box::new(SerialDevice::open(&connect_options)?))
    }));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = run_command(&args.command, &mut session, &mut out, &run_options)?;
    out.flush()?;

    if outcome == Outcome::Usage {
        print_usage(args.command.name())?;
    }

    Ok(())
}

/// Dispatch a device subcommand.
fn run_command(
    command: &Commands,
    session: &mut Session<'_>,
    out: &mut dyn Write,
    options: &RunOptions,
) -> Result<Outcome> {
    let command: &dyn Command = match command {
        Commands::Device(args) => args,
        Commands::Level(args) => args,
        Commands::Marker(args) => args,
        Commands::Menu(args) => args,
        Commands::Preset(args) => args,
        Commands::Raw(args) => args,
        Commands::Save(args) => args,
        Commands::Signal(args) => args,
        Commands::Sweep(args) => args,
        Commands::Trace(args) => args,
        Commands::Config { .. } => bail!("config is not a device command"),
    };

    command.run(session, out, options)
}

/// Print the help text of a subcommand.
fn print_usage(name: &str) -> Result<()> {
    let mut cli = Cli::command();
    match cli.find_subcommand_mut(name) {
        Some(subcommand) => subcommand.print_help()?,
        None => cli.print_help()?,
    }
    Ok(())
}

// ── Config subcommand ────────────────────────────────────────────────

/// Default config file template written by `config init`.
const CONFIG_TEMPLATE: &str = r#"# tsactl configuration
# All values shown are their defaults. Uncomment and change as needed.

# Serial port of the instrument (auto-detected by USB id when not set)
# device = "/dev/ttyACM0"

# Serial baud rate
# baudrate = 115200

# Reply timeout in milliseconds
# timeout_ms = 1000

# Log serial traffic to stderr
# debug = false

# Print read results (sweep, markers, traces, device info) as JSON
# json = false

[save]
# File name template for a screen capture (PNG).
# Placeholders: <date> (yymmdd), <time> (HHMMSS)
# capture = "SA_<date>_<time>.png"

# File name template for a single exported trace.
# Placeholders: <date> (yymmdd), <time> (HHMMSS), <trace> (trace id)
# trace = "SA_<date>_<time>_<trace>.csv"

# File name template when several traces are exported into one file
# traces = "SA_<date>_<time>.csv"
"#;

/// Dispatch a `config` subcommand.
fn handle_config_command(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Path => match FileConfig::config_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("Could not determine the config directory on this platform"),
        },
        ConfigCommand::Show => show_config()?,
        ConfigCommand::Init => init_config()?,
    }
    Ok(())
}

/// Print the effective configuration (file values merged with defaults).
fn show_config() -> Result<()> {
    let path = FileConfig::config_path();

    let (file_exists, config) = match &path {
        Some(p) if p.exists() => (true, FileConfig::load()?),
        _ => (false, FileConfig::default()),
    };

    match &path {
        Some(p) if file_exists => println!("Config file: {} (found)", p.display()),
        Some(p) => println!(
            "Config file: {} (not found - showing defaults)",
            p.display()
        ),
        None => println!("Config file: (cannot determine path on this platform)"),
    }

    println!();
    println!("{}", format_config(&config));
    Ok(())
}

/// Format a [`FileConfig`] as a human-readable table, showing defaults for `None` fields.
fn format_config(config: &FileConfig) -> String {
    fn show_str(val: Option<&str>, default: &str) -> String {
        val.map_or_else(
            || format!("\"{default}\"  (default)"),
            |v| format!("\"{v}\""),
        )
    }
    fn show_bool(val: Option<bool>, default: bool) -> String {
        val.map_or_else(|| format!("{default}  (default)"), |v| v.to_string())
    }
    fn show_num<T: ToString>(val: Option<T>, default: &str) -> String {
        val.map_or_else(|| format!("{default}  (default)"), |v| v.to_string())
    }

    let defaults = ConnectOptions::default();
    let run_defaults = RunOptions::default();

    format!(
        "\
device     = {device}
baudrate   = {baudrate}
timeout_ms = {timeout_ms}
debug      = {debug}
json       = {json}

[save]
capture    = {capture}
trace      = {trace}
traces     = {traces}",
        device = config.device.as_deref().map_or_else(
            || "(auto-detect)  (default)".to_string(),
            |v| format!("\"{v}\"")
        ),
        baudrate = show_num(config.baudrate, &DEFAULT_BAUDRATE.to_string()),
        timeout_ms = show_num(config.timeout_ms, &DEFAULT_TIMEOUT.as_millis().to_string()),
        debug = show_bool(config.debug, defaults.debug),
        json = show_bool(config.json, run_defaults.json),
        capture = show_str(config.save.capture.as_deref(), DEFAULT_CAPTURE_TEMPLATE),
        trace = show_str(config.save.trace.as_deref(), DEFAULT_TRACE_TEMPLATE),
        traces = show_str(config.save.traces.as_deref(), DEFAULT_TRACES_TEMPLATE),
    )
}

/// Write a default config template to the config file path if it does not exist yet.
fn init_config() -> Result<()> {
    let Some(path) = FileConfig::config_path() else {
        bail!("Could not determine the config directory on this platform");
    };

    if path.exists() {
        println!("Config file already exists at: {}", path.display());
        println!("Remove it first if you want to regenerate it.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {e}",
                parent.display()
            )
        })?;
    }

    std::fs::write(&path, CONFIG_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("Failed to write config file {}: {e}", path.display()))?;

    println!("Config file written to: {}", path.display());
    Ok(())
}

/// Load the configuration file, falling back to defaults on failure.
fn load_config(json_mode: bool) -> FileConfig {
    match FileConfig::load() {
        Ok(config) => config,
        Err(e) => {
            if !json_mode {
                eprintln!("{} {e}", "Warning: Failed to load config file:".yellow());
            }
            FileConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_template_parses_to_defaults() {
        let config: FileConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert!(config.device.is_none());
        assert!(config.save.trace.is_none());
    }

    #[test]
    fn test_format_config_defaults() {
        let text = format_config(&FileConfig::default());
        assert!(text.contains("device     = (auto-detect)  (default)"));
        assert!(text.contains("baudrate   = 115200  (default)"));
        assert!(text.contains("timeout_ms = 1000  (default)"));
        assert!(text.contains("trace      = \"SA_<date>_<time>_<trace>.csv\"  (default)"));
        assert!(text.contains("capture    = \"SA_<date>_<time>.png\"  (default)"));
    }

    #[test]
    fn test_format_config_file_values() {
        let config: FileConfig =
            toml::from_str("device = \"COM3\"\nbaudrate = 9600\n[save]\ntraces = \"all.csv\"")
                .unwrap();
        let text = format_config(&config);
        assert!(text.contains("device     = \"COM3\""));
        assert!(text.contains("baudrate   = 9600\n"));
        assert!(text.contains("traces     = \"all.csv\""));
    }
}
