//! Screen implementations. Each screen is a top-level Component.

pub mod auto_exit;
pub mod calculator;

use dlwatch_config::Config;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar, seeded from the config.
pub fn create_screens(config: &Config, adapters: &[String]) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Calculator,
            Box::new(calculator::CalculatorScreen::new(
                config.calculator.size_unit,
                config.calculator.speed_unit,
            )),
        ),
        (
            ScreenId::AutoExit,
            Box::new(auto_exit::AutoExitScreen::new(
                adapters.to_vec(),
                &config.auto_exit(),
            )),
        ),
    ]
}
