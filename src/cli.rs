//! Command-line interface definition and argument parsing.
//!
//! This module defines the global connection flags and the subcommands using
//! the [clap](https://docs.rs/clap/) library. Per-command flags live next to
//! their implementation in [`tsactl::commands`].
//!
//! Helper methods on [`Cli`] accept a [`FileConfig`] reference so that config-file
//! values act as defaults that CLI arguments can override (layered config).

use std::time::Duration;

use clap::{Parser, Subcommand};

use tsactl::commands::{
    device::DeviceArgs, level::LevelArgs, marker::MarkerArgs, menu::MenuArgs,
    preset::PresetArgs, raw::RawArgs, save::SaveArgs, signal::SignalArgs, sweep::SweepArgs,
    trace::TraceArgs,
};
use tsactl::config::connection::{DEFAULT_BAUDRATE, DEFAULT_TIMEOUT};
use tsactl::config::{
    ConnectOptions, DEFAULT_CAPTURE_TEMPLATE, DEFAULT_TRACE_TEMPLATE, DEFAULT_TRACES_TEMPLATE,
    FileConfig, RunOptions,
};

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Access device status, ID, battery, and firmware info
    #[command(visible_alias = "dev")]
    Device(DeviceArgs),

    /// Set trace unit, reference level, and scale
    #[command(visible_alias = "lv")]
    Level(LevelArgs),

    /// Enable marker, set frequency, and tracking
    #[command(visible_alias = "mk")]
    Marker(MarkerArgs),

    /// Trigger menu actions by ID
    Menu(MenuArgs),

    /// Load or save device presets
    #[command(visible_alias = "pr")]
    Preset(PresetArgs),

    /// Send low-level raw commands
    Raw(RawArgs),

    /// Export screen capture or trace data to file
    Save(SaveArgs),

    /// Configure signal processing options
    #[command(visible_alias = "sig")]
    Signal(SignalArgs),

    /// Set sweep parameters like frequency range and mode
    #[command(visible_alias = "sw")]
    Sweep(SweepArgs),

    /// Enable traces and set calculation modes
    #[command(visible_alias = "tr")]
    Trace(TraceArgs),

    /// Inspect or initialise the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

impl Commands {
    /// Name of the subcommand as registered with clap.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Device(_) => "device",
            Self::Level(_) => "level",
            Self::Marker(_) => "marker",
            Self::Menu(_) => "menu",
            Self::Preset(_) => "preset",
            Self::Raw(_) => "raw",
            Self::Save(_) => "save",
            Self::Signal(_) => "signal",
            Self::Sweep(_) => "sweep",
            Self::Trace(_) => "trace",
            Self::Config { .. } => "config",
        }
    }
}

/// Subcommands for `config`.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective configuration (file values + defaults for unset keys)
    Show,
    /// Write a default config.toml if none exists yet
    Init,
    /// Print the path to the config file
    Path,
}

/// Main command-line interface structure.
///
/// Global flags apply to every subcommand and may be given before or after
/// the subcommand name.
#[derive(Parser, Debug)]
#[command(name = "tsactl")]
#[command(about = "Command line tool for the tinySA spectrum analyzer")]
#[command(version)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Device serial port, e.g. /dev/ttyACM0 or COM1
    ///
    /// When not set, the first USB port with the instrument's vendor and
    /// product id is used.
    #[arg(short = 'D', long, global = true, env = "TSACTL_DEVICE", value_name = "PORT")]
    device: Option<String>,

    /// Device baud rate
    #[arg(long, global = true, env = "TSACTL_BAUDRATE")]
    baudrate: Option<u32>,

    /// Reply timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    timeout: Option<u64>,

    /// Log serial traffic to stderr
    #[arg(long, global = true, env = "TSACTL_DEBUG")]
    debug: bool,

    /// Print read results as JSON
    #[arg(long, global = true)]
    json: bool,
}

impl Cli {
    /// Extract connection options from CLI args and config file.
    ///
    /// Priority: CLI argument or environment > config file > default.
    #[must_use]
    pub fn connect_options(&self, config: &FileConfig) -> ConnectOptions {
        ConnectOptions {
            port: self.device.clone().or_else(|| config.device.clone()),
            baudrate: self
                .baudrate
                .or(config.baudrate)
                .unwrap_or(DEFAULT_BAUDRATE),
            timeout: self
                .timeout
                .or(config.timeout_ms)
                .map_or(DEFAULT_TIMEOUT, Duration::from_millis),
            debug: self.debug || config.debug.unwrap_or(false),
        }
    }

    /// Extract output and export options from CLI args and config file.
    #[must_use]
    pub fn run_options(&self, config: &FileConfig) -> RunOptions {
        RunOptions {
            json: self.json || config.json.unwrap_or(false),
            capture_template: config
                .save
                .capture
                .clone()
                .unwrap_or_else(|| DEFAULT_CAPTURE_TEMPLATE.to_string()),
            trace_template: config
                .save
                .trace
                .clone()
                .unwrap_or_else(|| DEFAULT_TRACE_TEMPLATE.to_string()),
            traces_template: config
                .save
                .traces
                .clone()
                .unwrap_or_else(|| DEFAULT_TRACES_TEMPLATE.to_string()),
        }
    }

    /// Whether `--json` was passed on the command line.
    #[must_use]
    pub const fn json(&self) -> bool {
        self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsactl::commands::{FrequencyArg, MarkerDelta};
    use tsactl::config::file::FileSaveConfig;
    use tsactl::device::{SpurRemoval, SweepMode, TraceCalc, TraceUnit};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_connect_options() {
        let args = parse(&["tsactl", "sweep"]);
        let options = args.connect_options(&FileConfig::default());

        assert_eq!(options, ConnectOptions::default());
        assert_eq!(args.run_options(&FileConfig::default()), RunOptions::default());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&[
            "tsactl", "sweep", "-D", "/dev/ttyACM1", "--baudrate", "9600", "--timeout", "250",
            "--debug", "--json",
        ]);
        let options = args.connect_options(&FileConfig::default());

        assert_eq!(options.port.as_deref(), Some("/dev/ttyACM1"));
        assert_eq!(options.baudrate, 9600);
        assert_eq!(options.timeout, Duration::from_millis(250));
        assert!(options.debug);
        assert!(args.json());
    }

    #[test]
    fn test_config_values_used_when_cli_absent() {
        let config = FileConfig {
            device: Some("COM4".to_string()),
            baudrate: Some(921_600),
            timeout_ms: Some(3000),
            debug: Some(true),
            json: Some(true),
            save: FileSaveConfig {
                capture: Some("~/shots/<date>.png".to_string()),
                trace: Some("t<trace>.csv".to_string()),
                traces: None,
            },
        };
        let args = parse(&["tsactl", "sweep"]);

        let options = args.connect_options(&config);
        assert_eq!(options.port.as_deref(), Some("COM4"));
        assert_eq!(options.baudrate, 921_600);
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert!(options.debug);

        let run = args.run_options(&config);
        assert!(run.json);
        assert_eq!(run.trace_template, "t<trace>.csv");
        assert_eq!(run.traces_template, DEFAULT_TRACES_TEMPLATE);
        assert_eq!(run.capture_template, "~/shots/<date>.png");
    }

    #[test]
    fn test_cli_overrides_config_values() {
        let config = FileConfig {
            device: Some("COM4".to_string()),
            baudrate: Some(921_600),
            ..FileConfig::default()
        };
        let args = parse(&["tsactl", "-D", "COM7", "--baudrate", "115200", "trace"]);
        let options = args.connect_options(&config);

        assert_eq!(options.port.as_deref(), Some("COM7"));
        assert_eq!(options.baudrate, 115_200);
    }

    #[test]
    fn test_sweep_flags() {
        let args = parse(&[
            "tsactl", "sw", "-s", "100M", "-e", "+50M", "--span", "-2M", "-C", "1.4e9", "-n",
            "450", "-t", "200ms", "-m", "high-input", "--cw", "433.92M",
        ]);
        let Commands::Sweep(sweep) = args.command else {
            panic!("expected sweep");
        };

        assert_eq!(sweep.start, Some(FrequencyArg::Absolute(100_000_000)));
        assert_eq!(sweep.stop, Some(FrequencyArg::Relative(50_000_000)));
        assert_eq!(sweep.span, Some(FrequencyArg::Relative(-2_000_000)));
        assert_eq!(sweep.center, Some(FrequencyArg::Absolute(1_400_000_000)));
        assert_eq!(sweep.points, Some(450));
        assert_eq!(sweep.time, Some(200_000));
        assert_eq!(sweep.mode, Some(SweepMode::HighInput));
        assert_eq!(sweep.cw, Some(433_920_000));
    }

    #[test]
    fn test_invalid_frequency_rejected() {
        assert!(Cli::try_parse_from(["tsactl", "sweep", "--start", "5x"]).is_err());
        assert!(Cli::try_parse_from(["tsactl", "sweep", "--cw", "-5M"]).is_err());
        assert!(Cli::try_parse_from(["tsactl", "sweep", "--start", "+1e6"]).is_err());
    }

    #[test]
    fn test_marker_flags() {
        let args = parse(&[
            "tsactl", "mk", "2", "-e", "--freq", "-100k", "--delta", "1", "--no-track", "-t", "3",
        ]);
        let Commands::Marker(marker) = args.command else {
            panic!("expected marker");
        };

        assert_eq!(marker.id, Some(2));
        assert!(marker.enable);
        assert_eq!(marker.frequency, Some(FrequencyArg::Relative(-100_000)));
        assert_eq!(marker.delta, Some(MarkerDelta::Reference(1)));
        assert_eq!(marker.tracking(), Some(false));
        assert_eq!(marker.trace, Some(3));
    }

    #[test]
    fn test_marker_id_must_be_positive() {
        assert!(Cli::try_parse_from(["tsactl", "marker", "0"]).is_err());
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Cli::try_parse_from(["tsactl", "marker", "1", "-e", "-d"]).is_err());
        assert!(Cli::try_parse_from(["tsactl", "trace", "1", "-e", "-d"]).is_err());
        assert!(Cli::try_parse_from(["tsactl", "level", "--ref", "-10", "--ref-auto"]).is_err());
        assert!(Cli::try_parse_from(["tsactl", "preset", "-l", "1", "-s", "2"]).is_err());
    }

    #[test]
    fn test_level_flags() {
        let args = parse(&["tsactl", "lv", "--ref", "-30", "-u", "dbmv", "-s", "2.5", "--lna"]);
        let Commands::Level(level) = args.command else {
            panic!("expected level");
        };

        assert_eq!(level.ref_level, Some(-30));
        assert_eq!(level.unit, Some(TraceUnit::DbmV));
        assert_eq!(level.scale, Some(2.5));
        assert!(level.lna);
    }

    #[test]
    fn test_trace_signal_and_preset_flags() {
        let args = parse(&["tsactl", "tr", "1", "-c", "aver16"]);
        let Commands::Trace(trace) = args.command else {
            panic!("expected trace");
        };
        assert_eq!(trace.calc, Some(TraceCalc::Aver16));

        let args = parse(&["tsactl", "sig", "--spur", "auto"]);
        let Commands::Signal(signal) = args.command else {
            panic!("expected signal");
        };
        assert_eq!(signal.spur, Some(SpurRemoval::Auto));

        let args = parse(&["tsactl", "pr", "-l", "0"]);
        let Commands::Preset(preset) = args.command else {
            panic!("expected preset");
        };
        assert_eq!(preset.load, Some(0));
    }

    #[test]
    fn test_save_and_raw_arguments() {
        let args = parse(&["tsactl", "save", "-t", "1", "-t", "3", "-o", "out.csv"]);
        let Commands::Save(save) = args.command else {
            panic!("expected save");
        };
        assert_eq!(save.traces, vec![1, 3]);
        assert_eq!(save.output.as_deref(), Some("out.csv"));
        assert!(!save.capture);

        let args = parse(&["tsactl", "save", "-c"]);
        let Commands::Save(save) = args.command else {
            panic!("expected save");
        };
        assert!(save.capture);
        assert!(save.traces.is_empty());

        let args = parse(&["tsactl", "raw", "marker", "1", "-1"]);
        let Commands::Raw(raw) = args.command else {
            panic!("expected raw");
        };
        assert_eq!(raw.command, vec!["marker", "1", "-1"]);
    }

    #[test]
    fn test_device_and_menu_arguments() {
        let args = parse(&["tsactl", "dev", "--id", "-b", "--set-bat-offset", "120", "-i"]);
        let Commands::Device(device) = args.command else {
            panic!("expected device");
        };
        assert!(device.get_id);
        assert!(device.battery);
        assert!(device.info);
        assert_eq!(device.set_battery_offset, Some(120));

        let args = parse(&["tsactl", "menu", "3", "1", "2"]);
        let Commands::Menu(menu) = args.command else {
            panic!("expected menu");
        };
        assert_eq!(menu.ids, vec![3, 1, 2]);

        assert!(Cli::try_parse_from(["tsactl", "menu"]).is_err());
    }

    #[test]
    fn test_config_subcommand() {
        let args = parse(&["tsactl", "config", "path"]);
        assert!(matches!(
            args.command,
            Commands::Config {
                command: ConfigCommand::Path
            }
        ));
        assert_eq!(args.command.name(), "config");
    }

    #[test]
    fn test_no_arguments_shows_help() {
        assert!(Cli::try_parse_from(["tsactl"]).is_err());
    }
}
