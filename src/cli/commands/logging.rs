//! `-v` / `VAULTGATE_LOG_LEVEL` handling.
//!
//! Each `-v` moves one step down [`LEVELS`]; the env var takes either a level
//! name or its index.

use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names by verbosity. Index 0 leaves the telemetry default (errors).
const LEVELS: [(&str, Option<Level>); 5] = [
    ("error", None),
    ("warn", Some(Level::WARN)),
    ("info", Some(Level::INFO)),
    ("debug", Some(Level::DEBUG)),
    ("trace", Some(Level::TRACE)),
];

fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim().to_lowercase();
    let index = match value.parse::<usize>() {
        Ok(index) => Some(index).filter(|index| *index < LEVELS.len()),
        Err(_) => LEVELS.iter().position(|(name, _)| *name == value),
    };
    index
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level: {value}"))
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_verbosity)
}

/// Tracing level for a verbosity count; counts past the table mean `TRACE`.
#[must_use]
pub fn level(verbosity: u8) -> Option<Level> {
    LEVELS
        .get(usize::from(verbosity))
        .map_or(Some(Level::TRACE), |(_, level)| *level)
}

/// Tracing level requested on the command line or through the env.
#[must_use]
pub fn level_from(matches: &ArgMatches) -> Option<Level> {
    level(matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace (default: error)")
            .env("VAULTGATE_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
