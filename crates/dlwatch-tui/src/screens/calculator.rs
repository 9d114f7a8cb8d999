//! Calculator screen: download duration and finish time, recomputed on
//! every keystroke.
//!
//! Layout:
//! ┌─ Download Calculator ──────────────────────────┐
//! │  Size                     Unit                 │
//! │  ╭──────────────────╮     ╭──────────────╮     │
//! │  │ 4.7█             │     │ ◂ GB ▸       │     │
//! │  Speed                    Unit                 │
//! │  ╭──────────────────╮     ╭──────────────╮     │
//! │  │ 100              │     │ ◂ Mbps ▸     │     │
//! │  ╭─ Result ───────────────────────────────╮    │
//! │  │  Duration   6m 43s                     │    │
//! │  │  Finish     03:06 PM                   │    │
//! │  ╰────────────────────────────────────────╯    │
//! └────────────────────────────────────────────────┘

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use dlwatch_core::{DownloadSpec, EstimateReport, SizeUnit, SpeedUnit};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::form::{self, FIELD_HEIGHT};
use crate::widgets::input::NumericInput;

/// Which form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalcField {
    Size,
    SizeUnit,
    Speed,
    SpeedUnit,
}

impl CalcField {
    const ALL: [CalcField; 4] = [Self::Size, Self::SizeUnit, Self::Speed, Self::SpeedUnit];
}

pub struct CalculatorScreen {
    focused: bool,
    active_field: CalcField,
    size: NumericInput,
    size_unit: SizeUnit,
    speed: NumericInput,
    speed_unit: SpeedUnit,
}

impl CalculatorScreen {
    pub fn new(size_unit: SizeUnit, speed_unit: SpeedUnit) -> Self {
        Self {
            focused: false,
            active_field: CalcField::Size,
            size: NumericInput::decimal(),
            size_unit,
            speed: NumericInput::decimal(),
            speed_unit,
        }
    }

    /// Current form as a calculator input. Empty fields count as zero.
    fn spec(&self) -> DownloadSpec {
        DownloadSpec::new(
            self.size.as_f64().unwrap_or_default(),
            self.size_unit,
            self.speed.as_f64().unwrap_or_default(),
            self.speed_unit,
        )
    }

    fn report(&self) -> EstimateReport {
        self.spec().report(&Local::now())
    }

    fn move_focus(&mut self, forward: bool) {
        let pos = CalcField::ALL
            .iter()
            .position(|&f| f == self.active_field)
            .unwrap_or(0);
        let next = form::cycle_index(pos, CalcField::ALL.len(), forward);
        self.active_field = CalcField::ALL[next];
    }

    fn active_input_mut(&mut self) -> Option<&mut NumericInput> {
        match self.active_field {
            CalcField::Size => Some(&mut self.size),
            CalcField::Speed => Some(&mut self.speed),
            CalcField::SizeUnit | CalcField::SpeedUnit => None,
        }
    }

    fn cycle_unit(&mut self, forward: bool) {
        match self.active_field {
            CalcField::SizeUnit => self.size_unit = form::cycle_variant(self.size_unit, forward),
            CalcField::SpeedUnit => {
                self.speed_unit = form::cycle_variant(self.speed_unit, forward);
            }
            CalcField::Size | CalcField::Speed => {}
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_result(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Result ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let report = self.report();
        let label = Style::default().fg(theme::DIM_WHITE);
        let lines = vec![
            Line::from(vec![
                Span::styled("  Duration   ", label),
                Span::styled(report.duration, theme::big_value()),
            ]),
            Line::from(vec![
                Span::styled("  Finish     ", label),
                Span::styled(report.finish_time, Style::default().fg(theme::NEON_CYAN)),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for CalculatorScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_focus(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_focus(false),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_unit(true),
            KeyCode::Left | KeyCode::Char('h') => self.cycle_unit(false),
            KeyCode::Backspace => {
                if let Some(input) = self.active_input_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.active_input_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let panel_w = 60u16.min(area.width.saturating_sub(2));
        let panel_h = 18u16.min(area.height);
        let x = (area.width.saturating_sub(panel_w)) / 2;
        let y = (area.height.saturating_sub(panel_h)) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        let block = Block::default()
            .title(" Download Calculator ")
            .title_style(theme::title_style())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let rows = Layout::vertical([
            Constraint::Length(FIELD_HEIGHT), // size
            Constraint::Length(FIELD_HEIGHT), // speed
            Constraint::Length(4),            // result
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .horizontal_margin(1)
        .split(inner);

        let size_cols =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .spacing(1)
                .split(rows[0]);
        let speed_cols =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .spacing(1)
                .split(rows[1]);

        let active = self.active_field;
        form::render_input(frame, size_cols[0], "Size", self.size.value(), active == CalcField::Size);
        form::render_selector(
            frame,
            size_cols[1],
            "Unit",
            &self.size_unit.to_string(),
            active == CalcField::SizeUnit,
        );
        form::render_input(
            frame,
            speed_cols[0],
            "Speed",
            self.speed.value(),
            active == CalcField::Speed,
        );
        form::render_selector(
            frame,
            speed_cols[1],
            "Unit",
            &self.speed_unit.to_string(),
            active == CalcField::SpeedUnit,
        );

        self.render_result(frame, rows[2]);

        let hints = Line::from(vec![
            Span::styled("↑↓ ", theme::key_hint_key()),
            Span::styled("field  ", theme::key_hint()),
            Span::styled("←→ ", theme::key_hint_key()),
            Span::styled("unit  ", theme::key_hint()),
            Span::styled("0-9 . ", theme::key_hint_key()),
            Span::styled("edit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), rows[4]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(screen: &mut CalculatorScreen, code: KeyCode) {
        screen
            .handle_key_event(KeyEvent::from(code))
            .expect("key handling is infallible");
    }

    fn type_str(screen: &mut CalculatorScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    #[test]
    fn empty_form_shows_placeholder() {
        let screen = CalculatorScreen::new(SizeUnit::Gigabytes, SpeedUnit::MegabitsPerSec);
        assert_eq!(screen.report(), EstimateReport::placeholder());
    }

    #[test]
    fn typing_size_and_speed_computes_duration() {
        let mut screen = CalculatorScreen::new(SizeUnit::Gigabytes, SpeedUnit::MegabitsPerSec);
        type_str(&mut screen, "1");
        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Down);
        type_str(&mut screen, "100");

        assert_eq!(screen.report().duration, "1m 25s");
    }

    #[test]
    fn letters_and_extra_points_are_filtered() {
        let mut screen = CalculatorScreen::new(SizeUnit::Gigabytes, SpeedUnit::MegabitsPerSec);
        type_str(&mut screen, "1.5.x2");
        assert_eq!(screen.size.value(), "1.52");
    }

    #[test]
    fn arrows_on_unit_field_cycle_units() {
        let mut screen = CalculatorScreen::new(SizeUnit::Gigabytes, SpeedUnit::MegabitsPerSec);
        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Right);
        assert_eq!(screen.size_unit, SizeUnit::Terabytes);

        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Left);
        assert_eq!(screen.speed_unit, SpeedUnit::KilobitsPerSec);
    }

    #[test]
    fn focus_wraps_around() {
        let mut screen = CalculatorScreen::new(SizeUnit::Gigabytes, SpeedUnit::MegabitsPerSec);
        press(&mut screen, KeyCode::Up);
        assert_eq!(screen.active_field, CalcField::SpeedUnit);
        press(&mut screen, KeyCode::Down);
        assert_eq!(screen.active_field, CalcField::Size);
    }

    #[test]
    fn backspace_edits_the_active_input() {
        let mut screen = CalculatorScreen::new(SizeUnit::Gigabytes, SpeedUnit::MegabitsPerSec);
        type_str(&mut screen, "25");
        press(&mut screen, KeyCode::Backspace);
        assert_eq!(screen.size.value(), "2");
    }
}
