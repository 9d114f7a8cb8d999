//! Reusable widgets and helpers shared by the screens.

pub mod bytes_fmt;
pub mod form;
pub mod input;
