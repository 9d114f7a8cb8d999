//! CLI glue over `dlwatch-config`: applies the `[defaults]` section
//! underneath global flags.

use clap::ValueEnum;
use tracing::warn;

pub use dlwatch_config::{Config, config_path, load_config, save_config};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Global flags merged with config-file defaults.
#[derive(Debug, Clone, Copy)]
pub struct Resolved {
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
}

/// Load the config file. A broken file is an error; a missing one is not.
pub fn load() -> Result<Config, CliError> {
    Ok(load_config()?)
}

/// Flag value if given, else the config default, else the built-in default.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Resolved {
    let output = global
        .output
        .or_else(|| parse_enum::<OutputFormat>("defaults.output", &cfg.defaults.output))
        .unwrap_or(OutputFormat::Table);
    let color = global
        .color
        .or_else(|| parse_enum::<ColorMode>("defaults.color", &cfg.defaults.color))
        .unwrap_or(ColorMode::Auto);

    Resolved {
        output,
        color: crate::output::should_color(color),
        quiet: global.quiet,
        yes: global.yes,
    }
}

fn parse_enum<T: ValueEnum>(key: &str, raw: &str) -> Option<T> {
    match T::from_str(raw, true) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = raw, error = %e, "ignoring invalid config default");
            None
        }
    }
}
