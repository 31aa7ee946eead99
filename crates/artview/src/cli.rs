#![forbid(unsafe_code)]

//! Command-line argument parsing for the session runner.
//!
//! Settings resolve in order: built-in defaults, the JSON config file,
//! `ARTVIEW_*` environment variables, then explicit flags.

use std::env;
use std::process;

use artview_core::ArtviewConfig;

use crate::session::{ReportFormat, SessionPlan};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
ARTview session runner

Assembles a mode, opens files into it, and prints how the panels are wired.

USAGE:
    artview [OPTIONS]

OPTIONS:
    --config=PATH        JSON config file
    --mode=NAME          Mode to assemble; repeat to switch modes in order
                         (default: config default_mode)
    --open=PATH          Open a file through the menu; repeatable
    --step=N             Step the file navigator forward N times
    --grid               Run the mapper after opening
    --inspect            Add a link inspector panel
    --report=FORMAT      Report format: 'text' or 'json' (default: text)
    --title=TITLE        Main window title
    --log=FILTER         Log filter directives (default: info)
    --log-json           Log as JSON lines
    --list-modes         List available modes and exit
    --print-config       Print the resolved config as JSON and exit
    --help, -h           Show this help message
    --version, -V        Show version

MODES:
    radar                Menu, file navigator, radar display, field and tilt pickers
    grid                 Menu and grid display
    map_to_grid          Radar display, mapper, and grid display

ENVIRONMENT VARIABLES:
    ARTVIEW_CONFIG       Config file path (overridden by --config)
    ARTVIEW_MODE         Override default_mode
    ARTVIEW_TITLE        Override window_title
    ARTVIEW_LOG          Override log.filter
    ARTVIEW_LOG_JSON     Override log.json (1/true/yes/on)";

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub config_path: Option<String>,
    /// Modes to assemble, in order. Empty means the config's default.
    pub modes: Vec<String>,
    pub open: Vec<String>,
    pub steps: usize,
    pub grid: bool,
    pub inspect: bool,
    pub report: ReportFormat,
    pub title: Option<String>,
    pub log_filter: Option<String>,
    pub log_json: bool,
    pub list_modes: bool,
    pub print_config: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Opts {
    /// Parse the process arguments, exiting on `--help`, `--version`, or
    /// bad input.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("artview {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    pub fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = get_env("ARTVIEW_CONFIG")
            && !val.trim().is_empty()
        {
            opts.config_path = Some(val);
        }

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--grid" => opts.grid = true,
                "--inspect" => opts.inspect = true,
                "--log-json" => opts.log_json = true,
                "--list-modes" => opts.list_modes = true,
                "--print-config" => opts.print_config = true,
                other => {
                    if let Some(val) = other.strip_prefix("--config=") {
                        opts.config_path = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--mode=") {
                        opts.modes.push(non_empty("--mode", val)?);
                    } else if let Some(val) = other.strip_prefix("--open=") {
                        opts.open.push(non_empty("--open", val)?);
                    } else if let Some(val) = other.strip_prefix("--step=") {
                        opts.steps = val.parse().map_err(|_| ParseError::InvalidValue {
                            flag: "--step",
                            value: val.to_string(),
                        })?;
                    } else if let Some(val) = other.strip_prefix("--report=") {
                        opts.report = match val.to_ascii_lowercase().as_str() {
                            "text" => ReportFormat::Text,
                            "json" => ReportFormat::Json,
                            _ => {
                                return Err(ParseError::InvalidValue {
                                    flag: "--report",
                                    value: val.to_string(),
                                });
                            }
                        };
                    } else if let Some(val) = other.strip_prefix("--title=") {
                        opts.title = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--log=") {
                        opts.log_filter = Some(val.to_string());
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }
        Ok(opts)
    }

    /// Load the config file if one was named, then apply environment and
    /// flag overrides.
    pub fn resolve_config<F>(&self, get_env: F) -> artview_core::Result<ArtviewConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match &self.config_path {
            Some(path) => ArtviewConfig::load(path)?,
            None => ArtviewConfig::default(),
        };
        let mut config = config.with_overrides_from(get_env);
        if let Some(mode) = self.modes.first() {
            config.default_mode = mode.clone();
        }
        if let Some(title) = &self.title {
            config.window_title = title.clone();
        }
        if let Some(filter) = &self.log_filter {
            config.log.filter = filter.clone();
        }
        if self.log_json {
            config.log.json = true;
        }
        Ok(config)
    }

    /// What the session should do, given the resolved config.
    #[must_use]
    pub fn plan(&self, config: &ArtviewConfig) -> SessionPlan {
        let modes = if self.modes.is_empty() {
            vec![config.default_mode.clone()]
        } else {
            self.modes.clone()
        };
        SessionPlan {
            modes,
            open: self.open.clone(),
            steps: self.steps,
            grid: self.grid,
            inspect: self.inspect,
        }
    }
}

fn non_empty(flag: &'static str, val: &str) -> Result<String, ParseError> {
    if val.trim().is_empty() {
        Err(ParseError::InvalidValue {
            flag,
            value: val.to_string(),
        })
    } else {
        Ok(val.to_string())
    }
}
