use std::time::Duration;

use clap::{Args, Subcommand};
use dfpu_dispatch::{emulator, DispatchConfig, Dispatcher};
use dfpu_transport::HidTransport;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod calc;
pub mod demo;
pub mod devices;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one packed operation.
    Calc(CalcArgs),
    /// Run all four operations on reference operands.
    Demo(DemoArgs),
    /// List HID devices and mark the accelerator.
    Devices(DevicesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Calc(args) => calc::run(args, format),
        Command::Demo(args) => demo::run(args, format),
        Command::Devices(args) => devices::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where operations are computed.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Skip device discovery and compute in software.
    #[arg(long, conflicts_with = "emulate")]
    pub software: bool,
    /// Route operations through the built-in accelerator emulator.
    #[arg(long)]
    pub emulate: bool,
    /// Per-transfer timeout (e.g. 100ms, 1s).
    #[arg(long, env = "DFPU_TIMEOUT", default_value = "100ms")]
    pub timeout: String,
}

impl TargetArgs {
    /// Whether a lost device should be looked for again.
    pub fn uses_hardware(&self) -> bool {
        !self.software && !self.emulate
    }

    pub fn dispatcher(&self) -> CliResult<Dispatcher> {
        let config = DispatchConfig {
            timeout: parse_duration(&self.timeout)?,
            ..DispatchConfig::default()
        };

        let dispatcher = if self.emulate {
            Dispatcher::with_transport(emulator::transport(), config)
        } else if self.software {
            Dispatcher::with_transport(HidTransport::new(config.filter), config)
        } else {
            Dispatcher::init_with_config(config)
        };
        Ok(dispatcher)
    }
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Operation: add, subtract, multiply or divide.
    pub operation: String,
    /// First operand: one value (used for every lane) or four comma-separated values.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub a: Vec<String>,
    /// Second operand, same shape as --a.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub b: Vec<String>,
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Repeat at this interval until interrupted (e.g. 1s, 250ms).
    #[arg(long, value_name = "INTERVAL")]
    pub watch: Option<String>,
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug, Default)]
pub struct DevicesArgs {
    /// Only list devices matching the accelerator filter.
    #[arg(long)]
    pub matching: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert_eq!(parse_duration("0ms").unwrap_err().code, USAGE);
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn software_target_never_connects() {
        let target = TargetArgs {
            software: true,
            emulate: false,
            timeout: "50ms".to_string(),
        };
        let dispatcher = target.dispatcher().unwrap();
        assert!(!dispatcher.is_connected());
        assert_eq!(dispatcher.config().timeout, Duration::from_millis(50));
        assert!(!target.uses_hardware());
    }

    #[test]
    fn emulated_target_is_connected() {
        let target = TargetArgs {
            software: false,
            emulate: true,
            timeout: "100ms".to_string(),
        };
        assert!(target.dispatcher().unwrap().is_connected());
    }
}
