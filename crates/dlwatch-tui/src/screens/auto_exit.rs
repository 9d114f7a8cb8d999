//! Auto-Exit screen: live throughput and the low-speed power action.
//!
//! Layout:
//! ┌─ Auto-Exit ──────────────┐┌─ Live ─────────────────────────────┐
//! │ Adapter   ◂ eth0 ▸       ││  03:04:05 PM                        │
//! │ Threshold [100] ◂ KB/s ▸ ││  ↓ 1.25 MB/s     ↑ 48.00 KB/s       │
//! │ Duration  [300] seconds  │├─ Download ─────────────────────────┤
//! │ Action    ◂ Shutdown ▸   ││  ⣀⣠⣤⣶⣿⣶⣤⣀ (Braille history)          │
//! │ [✓] Enable auto-exit     │├─ Status ───────────────────────────┤
//! │                          ││  Shutdown in 42s                    │
//! └──────────────────────────┘└────────────────────────────────────┘
//!
//! Every form edit is pushed to the watcher straight away, so the
//! countdown always reflects what is on screen.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph};

use dlwatch_core::sampler::normalize_adapter;
use dlwatch_core::{
    ALL_ADAPTERS, AutoExitConfig, MonitorEvent, PowerAction, ThresholdUnit, WatchUpdate,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::bytes_fmt;
use crate::widgets::form::{self, FIELD_HEIGHT};
use crate::widgets::input::NumericInput;

/// Samples kept for the history chart (two minutes at 1 Hz).
const HISTORY_LEN: usize = 120;

/// Which form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitField {
    Adapter,
    Threshold,
    ThresholdUnit,
    Duration,
    Action,
    Enabled,
}

impl ExitField {
    const ALL: [ExitField; 6] = [
        Self::Adapter,
        Self::Threshold,
        Self::ThresholdUnit,
        Self::Duration,
        Self::Action,
        Self::Enabled,
    ];
}

pub struct AutoExitScreen {
    focused: bool,
    active_field: ExitField,
    // Form data
    adapters: Vec<String>,
    adapter_index: usize,
    threshold: NumericInput,
    threshold_unit: ThresholdUnit,
    duration: NumericInput,
    action: PowerAction,
    enabled: bool,
    // Live data
    latest: Option<Arc<WatchUpdate>>,
    history: VecDeque<f64>,
}

impl AutoExitScreen {
    /// Build the form from the saved monitor settings. `adapters` is the
    /// watcher's list, led by "All Adapters".
    pub fn new(adapters: Vec<String>, config: &AutoExitConfig) -> Self {
        let mut adapters = adapters;
        if adapters.first().map(String::as_str) != Some(ALL_ADAPTERS) {
            adapters.insert(0, ALL_ADAPTERS.to_owned());
        }
        let adapter_index = config
            .adapter
            .as_deref()
            .and_then(|name| adapters.iter().position(|a| a == name))
            .unwrap_or(0);

        Self {
            focused: false,
            active_field: ExitField::Adapter,
            adapters,
            adapter_index,
            threshold: NumericInput::decimal()
                .with_value(&config.threshold.map(|v| v.to_string()).unwrap_or_default()),
            threshold_unit: config.threshold_unit,
            duration: NumericInput::integer()
                .with_value(&config.duration_secs.map(|s| s.to_string()).unwrap_or_default()),
            action: config.action,
            enabled: false,
            latest: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn selected_adapter(&self) -> Option<String> {
        normalize_adapter(self.adapters.get(self.adapter_index).map(String::as_str))
    }

    /// Current form as monitor settings.
    fn config(&self) -> AutoExitConfig {
        AutoExitConfig {
            threshold: self.threshold.as_f64(),
            threshold_unit: self.threshold_unit,
            duration_secs: self.duration.as_u64(),
            action: self.action,
            adapter: self.selected_adapter(),
        }
        .validated()
    }

    fn move_focus(&mut self, forward: bool) {
        let pos = ExitField::ALL
            .iter()
            .position(|&f| f == self.active_field)
            .unwrap_or(0);
        let next = form::cycle_index(pos, ExitField::ALL.len(), forward);
        self.active_field = ExitField::ALL[next];
    }

    /// Left/Right on a selector or the toggle.
    fn cycle(&mut self, forward: bool) -> Option<Action> {
        match self.active_field {
            ExitField::Adapter => {
                self.adapter_index = form::cycle_index(self.adapter_index, self.adapters.len(), forward);
                Some(Action::SelectAdapter(self.selected_adapter()))
            }
            ExitField::ThresholdUnit => {
                self.threshold_unit = form::cycle_variant(self.threshold_unit, forward);
                Some(Action::ConfigureMonitor(self.config()))
            }
            ExitField::Action => {
                self.action = form::cycle_variant(self.action, forward);
                Some(Action::ConfigureMonitor(self.config()))
            }
            ExitField::Enabled => Some(self.toggle_enabled()),
            ExitField::Threshold | ExitField::Duration => None,
        }
    }

    fn toggle_enabled(&mut self) -> Action {
        self.enabled = !self.enabled;
        Action::SetMonitorEnabled(self.enabled)
    }

    fn active_input_mut(&mut self) -> Option<&mut NumericInput> {
        match self.active_field {
            ExitField::Threshold => Some(&mut self.threshold),
            ExitField::Duration => Some(&mut self.duration),
            ExitField::Adapter | ExitField::ThresholdUnit | ExitField::Action | ExitField::Enabled => {
                None
            }
        }
    }

    fn record(&mut self, update: Arc<WatchUpdate>) {
        if let Some(sample) = &update.sample {
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(sample.download_bytes_per_sec);
        }
        self.latest = Some(update);
    }

    /// Headline for the status panel, with its style.
    fn status_text(&self) -> (String, Style) {
        let Some(update) = &self.latest else {
            return (
                "Waiting for the first sample".into(),
                Style::default().fg(theme::BORDER_GRAY),
            );
        };
        match update.event {
            MonitorEvent::Inactive => (
                "Auto-exit is off".into(),
                Style::default().fg(theme::BORDER_GRAY),
            ),
            MonitorEvent::Unconfigured => (
                "Set a threshold and a duration".into(),
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            MonitorEvent::AboveThreshold | MonitorEvent::Recovered => (
                "Download speed is above the threshold".into(),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            MonitorEvent::LowSpeedStarted { .. } | MonitorEvent::CountingDown { .. } => (
                update.countdown_text(),
                Style::default()
                    .fg(theme::ELECTRIC_YELLOW)
                    .add_modifier(Modifier::BOLD),
            ),
            MonitorEvent::Fire { .. } | MonitorEvent::ActionPerformed => (
                update.countdown_text(),
                Style::default()
                    .fg(theme::ERROR_RED)
                    .add_modifier(Modifier::BOLD),
            ),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Auto-Exit ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(FIELD_HEIGHT), // adapter
            Constraint::Length(FIELD_HEIGHT), // threshold + unit
            Constraint::Length(FIELD_HEIGHT), // duration
            Constraint::Length(FIELD_HEIGHT), // action
            Constraint::Length(1),            // enable
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .horizontal_margin(1)
        .split(inner);

        let active = self.active_field;
        let adapter = self
            .adapters
            .get(self.adapter_index)
            .map_or(ALL_ADAPTERS, String::as_str);
        form::render_selector(frame, rows[0], "Adapter", adapter, active == ExitField::Adapter);

        let threshold_cols =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .spacing(1)
                .split(rows[1]);
        form::render_input(
            frame,
            threshold_cols[0],
            "Threshold",
            self.threshold.value(),
            active == ExitField::Threshold,
        );
        form::render_selector(
            frame,
            threshold_cols[1],
            "Unit",
            &self.threshold_unit.to_string(),
            active == ExitField::ThresholdUnit,
        );

        form::render_input(
            frame,
            rows[2],
            "Duration (seconds)",
            self.duration.value(),
            active == ExitField::Duration,
        );
        form::render_selector(
            frame,
            rows[3],
            "Action",
            &self.action.to_string(),
            active == ExitField::Action,
        );
        form::render_toggle(
            frame,
            rows[4],
            "Enable auto-exit",
            self.enabled,
            active == ExitField::Enabled,
        );

        let hints = Line::from(vec![
            Span::styled("↑↓ ", theme::key_hint_key()),
            Span::styled("field  ", theme::key_hint()),
            Span::styled("←→ ", theme::key_hint_key()),
            Span::styled("change  ", theme::key_hint()),
            Span::styled("space ", theme::key_hint_key()),
            Span::styled("toggle  ", theme::key_hint()),
            Span::styled("^S ", theme::key_hint_key()),
            Span::styled("save", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), rows[6]);
    }

    fn render_live(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Live ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let clock = Local::now().format("%I:%M:%S %p").to_string();
        let (down, up) = self
            .latest
            .as_ref()
            .and_then(|u| u.sample.as_ref())
            .map_or_else(
                || ("--".to_owned(), "--".to_owned()),
                |s| (s.formatted_download.clone(), s.formatted_upload.clone()),
            );

        let lines = vec![
            Line::from(Span::styled(
                format!("  {clock}"),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(vec![
                Span::styled("  ↓ ", Style::default().fg(theme::NEON_CYAN)),
                Span::styled(format!("{down:<14}"), theme::big_value()),
                Span::styled("↑ ", Style::default().fg(theme::CORAL)),
                Span::styled(up, Style::default().fg(theme::DIM_WHITE)),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Download ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        if self.history.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  No samples yet").style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        // Right-align so the newest sample sits at the right edge
        let offset = HISTORY_LEN - self.history.len();
        let points: Vec<(f64, f64)> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, &rate)| ((offset + i) as f64, rate))
            .collect();
        let peak = self.history.iter().copied().fold(0.0_f64, f64::max);
        let threshold_line: Vec<(f64, f64)> = self
            .config()
            .threshold_bytes_per_sec()
            .map(|t| vec![(0.0, t), ((HISTORY_LEN - 1) as f64, t)])
            .unwrap_or_default();
        let threshold = threshold_line.first().map_or(0.0, |&(_, t)| t);
        let y_max = bytes_fmt::chart_ceiling(peak.max(threshold));

        let mut datasets = vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::NEON_CYAN))
                .data(&points),
        ];
        if !threshold_line.is_empty() {
            datasets.push(
                Dataset::default()
                    .marker(Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(theme::CORAL))
                    .data(&threshold_line),
            );
        }

        let y_labels = vec![
            Span::styled("0", Style::default().fg(theme::BORDER_GRAY)),
            Span::styled(
                bytes_fmt::fmt_rate_axis(y_max / 2.0),
                Style::default().fg(theme::BORDER_GRAY),
            ),
            Span::styled(
                bytes_fmt::fmt_rate_axis(y_max),
                Style::default().fg(theme::BORDER_GRAY),
            ),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([0.0, (HISTORY_LEN - 1) as f64])
                    .style(Style::default().fg(theme::BORDER_GRAY)),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, y_max])
                    .labels(y_labels)
                    .style(Style::default().fg(theme::BORDER_GRAY)),
            );
        frame.render_widget(chart, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Status ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (text, style) = self.status_text();
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!("  {text}"), style))),
            inner,
        );
    }
}

impl Component for AutoExitScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('s') {
            return Ok(Some(Action::SaveMonitorConfig(self.config())));
        }

        let action = match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_focus(true);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_focus(false);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => self.cycle(true),
            KeyCode::Left | KeyCode::Char('h') => self.cycle(false),
            KeyCode::Char(' ') | KeyCode::Enter if self.active_field == ExitField::Enabled => {
                Some(self.toggle_enabled())
            }
            KeyCode::Backspace => self
                .active_input_mut()
                .is_some_and(NumericInput::pop)
                .then(|| Action::ConfigureMonitor(self.config())),
            KeyCode::Char(c) => self
                .active_input_mut()
                .is_some_and(|input| input.push(c))
                .then(|| Action::ConfigureMonitor(self.config())),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::WatchUpdated(update) = action {
            self.record(Arc::clone(update));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let cols = Layout::horizontal([Constraint::Length(40), Constraint::Min(20)]).split(area);
        let right = Layout::vertical([
            Constraint::Length(4), // clock + speeds
            Constraint::Min(6),    // history
            Constraint::Length(3), // status
        ])
        .split(cols[1]);

        self.render_form(frame, cols[0]);
        self.render_live(frame, right[0]);
        self.render_history(frame, right[1]);
        self.render_status(frame, right[2]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
