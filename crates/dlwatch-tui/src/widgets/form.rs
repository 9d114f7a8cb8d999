//! Form field rendering shared by the Calculator and Auto-Exit screens.
//!
//! Each input and selector takes four rows: a label line and a
//! three-row bordered box. Toggles take one row.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use strum::IntoEnumIterator;

use crate::theme;

/// Rows taken by [`render_input`] and [`render_selector`].
pub const FIELD_HEIGHT: u16 = 4;

/// Step to the next (or previous) variant of an enum, wrapping around.
pub fn cycle_variant<T>(current: T, forward: bool) -> T
where
    T: IntoEnumIterator + PartialEq + Copy,
{
    let variants: Vec<T> = T::iter().collect();
    let len = variants.len();
    let pos = variants.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
    variants.get(next).copied().unwrap_or(current)
}

/// Step an index through `0..len`, wrapping around.
pub fn cycle_index(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

/// Split `area` into the label row and the bordered value box.
fn field_box(frame: &mut Frame, area: Rect, label: &str, active: bool) -> Option<Rect> {
    if area.height < FIELD_HEIGHT {
        return None;
    }

    frame.render_widget(
        Paragraph::new(Span::styled(label, theme::field_label(active))),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if active {
            theme::border_focused()
        } else {
            theme::border_default()
        });

    let block_area = Rect::new(area.x, area.y + 1, area.width, FIELD_HEIGHT - 1);
    let inner = block.inner(block_area);
    frame.render_widget(block, block_area);
    Some(inner)
}

/// Text input with a block cursor when active.
pub fn render_input(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let Some(inner) = field_box(frame, area, label, active) else {
        return;
    };
    let text = if active {
        format!("{value}\u{2588}")
    } else {
        value.to_owned()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(theme::NEON_CYAN))),
        inner,
    );
}

/// Inline selector: `◂ value ▸`.
pub fn render_selector(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let Some(inner) = field_box(frame, area, label, active) else {
        return;
    };
    let arrow_style = if active {
        Style::default().fg(theme::ELECTRIC_PURPLE)
    } else {
        Style::default().fg(theme::BORDER_GRAY)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" \u{25C2} ", arrow_style),
            Span::styled(value.to_owned(), theme::field_value(active)),
            Span::styled(" \u{25B8}", arrow_style),
        ])),
        inner,
    );
}

/// Checkbox row: `[✓] label`.
pub fn render_toggle(frame: &mut Frame, area: Rect, label: &str, value: bool, active: bool) {
    if area.height < 1 {
        return;
    }
    let marker = if value { "[\u{2713}]" } else { "[ ]" };
    let marker_style = if active {
        Style::default().fg(theme::ELECTRIC_PURPLE)
    } else if value {
        Style::default().fg(theme::SUCCESS_GREEN)
    } else {
        Style::default().fg(theme::BORDER_GRAY)
    };

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{marker} "), marker_style),
            Span::styled(label.to_owned(), theme::field_label(active)),
        ])),
        area,
    );
}

#[cfg(test)]
mod tests {
    use dlwatch_core::{PowerAction, SizeUnit};

    use super::*;

    #[test]
    fn variants_wrap_both_ways() {
        assert_eq!(cycle_variant(SizeUnit::Terabytes, true), SizeUnit::Bytes);
        assert_eq!(cycle_variant(SizeUnit::Bytes, false), SizeUnit::Terabytes);
        assert_eq!(cycle_variant(PowerAction::Shutdown, true), PowerAction::Restart);
    }

    #[test]
    fn indices_wrap_and_tolerate_empty() {
        assert_eq!(cycle_index(2, 3, true), 0);
        assert_eq!(cycle_index(0, 3, false), 2);
        assert_eq!(cycle_index(0, 0, true), 0);
    }
}
