//! Config subcommand handlers.

use dialoguer::{Input, Select};
use strum::IntoEnumIterator;

use dlwatch_config::{
    CalculatorDefaults, ConfigError, KNOWN_KEYS, load_config_file, load_config_or_default,
};
use dlwatch_core::sampler::normalize_adapter;
use dlwatch_core::{
    AutoExitConfig, NetworkSampler, PowerAction, SizeUnit, SpeedUnit, SysinfoSource,
    ThresholdUnit,
};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Pick one variant of an enum, starting on `current`.
fn select_variant<T>(prompt: &str, current: T) -> Result<T, CliError>
where
    T: IntoEnumIterator + ToString + PartialEq + Copy,
{
    let variants: Vec<T> = T::iter().collect();
    let labels: Vec<String> = variants.iter().map(ToString::to_string).collect();
    let default = variants.iter().position(|v| *v == current).unwrap_or(0);

    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()
        .map_err(prompt_err)?;
    Ok(variants.get(index).copied().unwrap_or(current))
}

/// Free-text prompt that may be left empty.
fn optional_input(prompt: &str) -> Result<Option<String>, CliError> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    Ok(Some(raw.trim().to_owned()).filter(|s| !s.is_empty()))
}

fn render_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

fn set_error(err: ConfigError) -> CliError {
    match err {
        ConfigError::UnknownKey { key } => CliError::Validation {
            field: key,
            reason: format!("unknown config key. Valid keys: {}", KNOWN_KEYS.join(", ")),
        },
        ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
        other => other.into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = config::resolve(global, &load_config_or_default());

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("✨ dlwatch configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let Config {
                defaults,
                calculator,
                monitor,
            } = load_config_file(&config_path).unwrap_or_default();

            // 1. Calculator units
            let size_unit = select_variant::<SizeUnit>(
                "Default size unit",
                calculator.size_unit,
            )?;
            let speed_unit = select_variant::<SpeedUnit>(
                "Default speed unit",
                calculator.speed_unit,
            )?;

            // 2. Monitor threshold
            let threshold = optional_input("Low-speed threshold (empty to skip)")?
                .map(|raw| {
                    raw.parse::<f64>().map_err(|_| CliError::Validation {
                        field: "threshold".into(),
                        reason: format!("'{raw}' is not a number"),
                    })
                })
                .transpose()?;
            let threshold_unit = select_variant::<ThresholdUnit>(
                "Threshold unit",
                monitor.threshold_unit,
            )?;

            // 3. Duration and action
            let duration_secs = optional_input("Low-speed duration, e.g. 300 or 5m (empty to skip)")?
                .map(|raw| util::parse_duration_secs(&raw))
                .transpose()?;
            let action = select_variant::<PowerAction>("Power action", monitor.action)?;

            // 4. Adapter
            let adapters = NetworkSampler::new(SysinfoSource::new()).adapters();
            let current_adapter = adapters
                .iter()
                .position(|name| monitor.adapter.as_deref() == Some(name.as_str()))
                .unwrap_or(0);
            let adapter_index = Select::new()
                .with_prompt("Adapter to watch")
                .items(&adapters)
                .default(current_adapter)
                .interact()
                .map_err(prompt_err)?;
            let adapter = normalize_adapter(adapters.get(adapter_index).map(String::as_str));

            let cfg = Config {
                defaults,
                calculator: CalculatorDefaults {
                    size_unit,
                    speed_unit,
                },
                monitor: AutoExitConfig {
                    threshold,
                    threshold_unit,
                    duration_secs,
                    action,
                    adapter,
                }
                .validated(),
            };

            let path = config::save_config(&cfg)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("\n  Try it: dlwatch watch --dry-run");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load()?;
            let rendered = output::render_single(out.output, &cfg, render_toml, render_toml);
            output::print_output(&rendered, out.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let path = config::config_path();
            let mut cfg = load_config_file(&path)?;
            cfg.set(&key, &value).map_err(set_error)?;
            dlwatch_config::save_config_to(&cfg, &path)?;
            if !out.quiet {
                eprintln!("✓ Set {key} in {}", path.display());
            }
            Ok(())
        }
    }
}
