//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dlwatch_config::Config;
use dlwatch_core::{AutoExitConfig, MonitorEvent, WatchUpdate, Watcher};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// How long a notification stays in the status bar.
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Terminal size for responsive layout.
    terminal_size: (u16, u16),
    /// Action sender; the data bridge and key handlers dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver; the main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Sampler + monitor running in the background.
    watcher: Watcher,
    /// Most recent watcher tick, for the status bar.
    latest: Option<Arc<WatchUpdate>>,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Active notification with display timestamp.
    notification: Option<(Notification, Instant)>,
}

impl App {
    /// Create the app around a running [`Watcher`].
    pub fn new(config: &Config, watcher: Watcher) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(config, watcher.adapters()).into_iter().collect();
        let active_screen = ScreenId::default();
        if let Some(screen) = screens.get_mut(&active_screen) {
            screen.set_focused(true);
        }
        let notification = reconcile_adapter(config, &watcher).map(|n| (n, Instant::now()));

        Self {
            active_screen,
            screens,
            running: true,
            help_visible: false,
            terminal_size: (80, 24),
            action_tx,
            action_rx,
            watcher,
            latest: None,
            data_cancel: CancellationToken::new(),
            notification,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let size = tui.terminal.size()?;
        self.terminal_size = (size.width, size.height);

        tokio::spawn(spawn_data_bridge(
            self.watcher.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::new(Duration::from_millis(33)); // ~30 FPS

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.data_cancel.cancel();
        self.watcher.stop().await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                    Ok(Some(Action::Quit))
                }
                _ => Ok(None),
            };
        }

        // Numeric fields never take letters, so plain `q` is safe as quit
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c' | 'q'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('?')) => {
                return Ok(Some(Action::ToggleHelp));
            }

            (_, KeyCode::F(n)) => {
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (_, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Render => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            // ── Watcher commands ─────────────────────────────────────
            Action::SelectAdapter(adapter) => {
                self.watcher_command(self.watcher.set_adapter(adapter.as_deref()))?;
            }
            Action::SetMonitorEnabled(enabled) => {
                self.watcher_command(self.watcher.set_enabled(*enabled))?;
            }
            Action::ConfigureMonitor(config) => {
                self.watcher_command(self.watcher.configure(config.clone()))?;
            }
            Action::SaveMonitorConfig(config) => {
                let notification = save_monitor_config(config);
                self.action_tx.send(Action::Notify(notification))?;
            }

            // ── Watcher data: every screen keeps its own history ─────
            Action::WatchUpdated(update) => {
                if let Some(error) = &update.action_error {
                    self.action_tx.send(Action::Notify(Notification::error(format!(
                        "{} failed: {error}",
                        update.action
                    ))))?;
                }
                self.latest = Some(Arc::clone(update));
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Surface a rejected watcher command as a notification.
    fn watcher_command(&self, result: Result<(), dlwatch_core::CoreError>) -> Result<()> {
        if let Err(e) = result {
            warn!(error = %e, "watcher command rejected");
            self.action_tx
                .send(Action::Notify(Notification::error(e.to_string())))?;
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let narrow = self.terminal_size.0 < 60;
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let label = if narrow { id.label_short() } else { id.label() };
                Line::from(Span::styled(format!(" F{} {label} ", id.number()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Clock, live speeds, countdown, then a notification or key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            format!(" {}", Local::now().format("%I:%M:%S %p")),
            Style::default().fg(theme::DIM_WHITE),
        )];

        if let Some(update) = &self.latest {
            if let Some(sample) = &update.sample {
                spans.push(Span::styled(
                    format!("  ↓ {}", sample.formatted_download),
                    Style::default().fg(theme::NEON_CYAN),
                ));
                spans.push(Span::styled(
                    format!("  ↑ {}", sample.formatted_upload),
                    Style::default().fg(theme::CORAL),
                ));
            }
            let countdown = update.countdown_text();
            if !countdown.is_empty() {
                let color = match update.event {
                    MonitorEvent::Fire { .. } | MonitorEvent::ActionPerformed => theme::ERROR_RED,
                    _ => theme::ELECTRIC_YELLOW,
                };
                spans.push(Span::styled(
                    format!("  {countdown}"),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            }
        }

        match &self.notification {
            Some((notification, _)) => {
                let color = match notification.level {
                    NotificationLevel::Success => theme::SUCCESS_GREEN,
                    NotificationLevel::Error => theme::ERROR_RED,
                };
                spans.push(Span::styled(" │ ", theme::key_hint()));
                spans.push(Span::styled(
                    notification.message.clone(),
                    Style::default().fg(color),
                ));
            }
            None => {
                spans.push(Span::styled(" │ ? help  q quit", theme::key_hint()));
            }
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 52u16.min(area.width.saturating_sub(4));
        let help_height = 17u16.min(area.height.saturating_sub(4));
        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let row = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };
        let heading = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };

        let help_text = vec![
            Line::from(""),
            heading("Navigation"),
            row("F1 F2", "Jump to screen"),
            row("Tab", "Next screen"),
            row("↑↓ j/k", "Move between fields"),
            row("←→ h/l", "Change unit / selection"),
            Line::from(""),
            heading("Editing"),
            row("0-9 .", "Type into number fields"),
            row("Backspace", "Delete last character"),
            row("Space", "Toggle auto-exit"),
            row("Ctrl+S", "Save auto-exit settings"),
            Line::from(""),
            row("q", "Quit"),
            Line::from(Span::styled(
                "                     Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}

/// Write the monitor section back to the config file, leaving the rest alone.
fn save_monitor_config(monitor: &AutoExitConfig) -> Notification {
    let path = dlwatch_config::config_path();
    let result = dlwatch_config::load_config_file(&path).and_then(|mut cfg| {
        cfg.monitor = monitor.clone();
        dlwatch_config::save_config_to(&cfg, &path)
    });
    match result {
        Ok(()) => {
            info!(path = %path.display(), "auto-exit settings saved");
            Notification::success(format!("Saved to {}", path.display()))
        }
        Err(e) => {
            warn!(error = %e, "failed to save auto-exit settings");
            Notification::error(format!("Save failed: {e}"))
        }
    }
}

/// A saved adapter that is not present any more would leave the watcher
/// filtering on nothing while the form shows "All Adapters". Fall back to
/// every adapter and tell the user.
fn reconcile_adapter(config: &Config, watcher: &Watcher) -> Option<Notification> {
    let missing = config
        .monitor
        .adapter
        .as_deref()
        .filter(|name| !watcher.adapters().iter().any(|a| a == name))?;

    warn!(adapter = missing, "saved adapter not found, watching all adapters");
    match watcher.set_adapter(None) {
        Ok(()) => Some(Notification::error(format!(
            "Adapter {missing} not found, watching all adapters"
        ))),
        Err(e) => Some(Notification::error(format!("Adapter {missing}: {e}"))),
    }
}
