//! Screen identifier enum.

use std::fmt;

/// Identifies each primary TUI screen, reachable with F1/F2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Calculator, // 1
    AutoExit, // 2
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 2] = [Self::Calculator, Self::AutoExit];

    /// Function-key number for this screen.
    pub fn number(self) -> u8 {
        match self {
            Self::Calculator => 1,
            Self::AutoExit => 2,
        }
    }

    /// Screen from a function-key number. Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|screen| screen.number() == n)
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Calculator => "Calculator",
            Self::AutoExit => "Auto-Exit",
        }
    }

    /// Compact label for narrow terminals (< 60 cols).
    pub fn label_short(self) -> &'static str {
        match self {
            Self::Calculator => "Calc",
            Self::AutoExit => "Exit",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
