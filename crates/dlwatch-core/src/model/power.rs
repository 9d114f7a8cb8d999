// ── Power actions ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// What to do to the machine once the low-speed run has lasted long enough.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum PowerAction {
    #[default]
    #[strum(to_string = "Shutdown", serialize = "poweroff")]
    Shutdown,
    #[strum(to_string = "Restart", serialize = "reboot")]
    Restart,
    Hibernate,
    #[strum(to_string = "Sleep", serialize = "suspend")]
    Sleep,
}

deserialize_from_str!(PowerAction, "power action");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("reboot".parse::<PowerAction>().ok(), Some(PowerAction::Restart));
        assert_eq!("SUSPEND".parse::<PowerAction>().ok(), Some(PowerAction::Sleep));
        assert_eq!("hibernate".parse::<PowerAction>().ok(), Some(PowerAction::Hibernate));
    }

    #[test]
    fn config_strings_accept_any_case() {
        assert_eq!(PowerAction::try_from("Shutdown".to_owned()), Ok(PowerAction::Shutdown));
        assert_eq!(PowerAction::try_from("sleep".to_owned()), Ok(PowerAction::Sleep));
        assert_eq!(
            PowerAction::try_from("nap".to_owned()),
            Err("unknown power action `nap`".to_owned())
        );
    }

    #[test]
    fn displays_title_case() {
        assert_eq!(PowerAction::Shutdown.to_string(), "Shutdown");
        assert_eq!(PowerAction::Sleep.to_string(), "Sleep");
    }
}
