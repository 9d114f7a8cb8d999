//! Numeric text input with per-keystroke filtering.
//!
//! Calculator fields take digits and a single decimal point; the
//! threshold and duration fields take digits only.

const MAX_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericInput {
    value: String,
    allow_decimal: bool,
}

impl NumericInput {
    /// Digits only.
    pub fn integer() -> Self {
        Self {
            value: String::new(),
            allow_decimal: false,
        }
    }

    /// Digits and at most one `.`.
    pub fn decimal() -> Self {
        Self {
            value: String::new(),
            allow_decimal: true,
        }
    }

    /// Pre-fill, dropping every character the filter would reject.
    pub fn with_value(mut self, raw: &str) -> Self {
        for c in raw.chars() {
            self.push(c);
        }
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Append `c` if the filter accepts it. Returns whether it did.
    pub fn push(&mut self, c: char) -> bool {
        if self.value.len() >= MAX_LEN {
            return false;
        }
        let accepted = c.is_ascii_digit()
            || (c == '.' && self.allow_decimal && !self.value.contains('.'));
        if accepted {
            self.value.push(c);
        }
        accepted
    }

    /// Remove the last character. Returns whether anything was removed.
    pub fn pop(&mut self) -> bool {
        self.value.pop().is_some()
    }

    /// Parsed value; `None` when empty or just ".".
    pub fn as_f64(&self) -> Option<f64> {
        self.value.parse().ok()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.value.parse().ok()
    }
}
