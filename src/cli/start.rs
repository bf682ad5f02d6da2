use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch, telemetry,
};
use anyhow::Result;

/// Parses the process arguments, installs the subscriber and returns the
/// [`Action`] to run.
///
/// # Errors
/// Returns an error if telemetry cannot be set up or the arguments do not map
/// to an action.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();
    telemetry::init(logging::level_from(&matches))?;
    dispatch::handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flags_reach_the_subscriber_level() {
        temp_env::with_vars([("VAULTGATE_LOG_LEVEL", None::<&str>)], || {
            let matches = commands::new().get_matches_from(vec!["vaultgate", "-vvv", "whoami"]);
            assert_eq!(logging::level_from(&matches), Some(tracing::Level::DEBUG));

            let matches = commands::new().get_matches_from(vec!["vaultgate", "whoami"]);
            assert_eq!(logging::level_from(&matches), None);
        });
    }
}
