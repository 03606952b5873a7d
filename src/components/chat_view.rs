use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::action::Action;
use crate::chat::types::Features;
use crate::chat::{ChatSnapshot, Origin};
use crate::components::spinner::Spinner;
use crate::components::Component;

const COMPOSER_HEIGHT: u16 = 3;
const PAGE: u16 = 10;

/// Paints a [`ChatSnapshot`]: transcript, progress line, state map and composer.
///
/// Holds only the last snapshot it was given plus its own scroll position; all
/// chat state lives in the view state and arrives through [`ChatView::set_snapshot`].
pub struct ChatView {
    snapshot: ChatSnapshot,
    features: Features,
    scroll_offset: u16,
    line_count: usize,
    visible_height: u16,
    auto_scroll: bool,
    progress_spinner: Spinner,
}

impl ChatView {
    pub fn new(features: Features) -> Self {
        Self {
            snapshot: ChatSnapshot::default(),
            features,
            scroll_offset: 0,
            line_count: 0,
            visible_height: 10,
            auto_scroll: true,
            progress_spinner: Spinner::new(),
        }
    }

    pub fn set_snapshot(&mut self, snapshot: ChatSnapshot) {
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> &ChatSnapshot {
        &self.snapshot
    }

    /// Returns whether the spinner advanced and a redraw is worthwhile.
    pub fn tick_spinner(&mut self) -> bool {
        self.snapshot.progress.is_some() && self.progress_spinner.tick()
    }

    pub fn transcript_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for entry in &self.snapshot.transcript {
            let (who, style) = match entry.origin {
                Origin::Own => (
                    "You",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Origin::Other => (
                    "Assistant",
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                ),
            };
            lines.push(Line::from(vec![
                Span::styled(who, style),
                Span::styled(
                    format!(" {}", entry.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            for line in entry.display_lines() {
                lines.push(Line::from(format!("  {}", line)));
            }
            lines.push(Line::from(""));
        }

        if let Some(progress) = &self.snapshot.progress {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", self.progress_spinner.current_frame()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    progress.text.clone(),
                    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                ),
                Span::styled(
                    format!(" {}", progress.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }

        lines
    }

    pub fn state_lines(&self) -> Vec<Line<'static>> {
        self.snapshot
            .state
            .iter()
            .map(|(category, values)| {
                let mut spans = vec![Span::styled(
                    format!("{}:", category),
                    Style::default().add_modifier(Modifier::BOLD),
                )];
                for value in values {
                    spans.push(Span::raw(format!(" {}", value.value)));
                    spans.push(Span::styled(
                        format!(" ({})", value.score),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    }

    fn state_title(&self) -> String {
        match self.snapshot.accuracy.filter(|_| self.features.accuracy) {
            Some(accuracy) => format!(" State · accuracy {:.3} ", accuracy),
            None => " State ".to_string(),
        }
    }

    fn composer_title(&self) -> &'static str {
        if self.snapshot.feedback_eligible {
            " Message · Enter send · Ctrl+Y correct · Ctrl+N wrong "
        } else {
            " Message · Enter send "
        }
    }

    /// Everything the view would paint, as plain text lines.
    pub fn plain_text(&self) -> Vec<String> {
        let mut out: Vec<String> = self.transcript_lines().iter().map(line_text).collect();
        if self.features.state_map && !self.snapshot.state.is_empty() {
            out.push(self.state_title().trim().to_string());
            out.extend(self.state_lines().iter().map(line_text));
        } else if let Some(accuracy) = self.snapshot.accuracy.filter(|_| self.features.accuracy) {
            out.push(format!("Accuracy {:.3}", accuracy));
        }
        if self.snapshot.feedback_eligible {
            out.push("Is this state correct? [Ctrl+Y / Ctrl+N]".to_string());
        }
        out
    }

    fn state_panel_height(&self) -> u16 {
        if !self.features.state_map {
            return 0;
        }
        let rows = self.snapshot.state.len().max(1) as u16;
        rows.saturating_add(2).min(8)
    }

    pub fn scroll_up(&mut self, n: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
        let max = self.max_offset();
        if self.scroll_offset >= max {
            self.scroll_offset = max;
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.auto_scroll = false;
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
        self.scroll_offset = self.max_offset();
    }

    pub fn is_auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    fn max_offset(&self) -> u16 {
        self.line_count
            .saturating_sub(self.visible_height as usize)
            .min(u16::MAX as usize) as u16
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => Some(Action::Quit),
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('y') if ctrl => self
                .snapshot
                .feedback_eligible
                .then_some(Action::Feedback(true)),
            KeyCode::Char('n') if ctrl => self
                .snapshot
                .feedback_eligible
                .then_some(Action::Feedback(false)),
            KeyCode::Enter => Some(Action::Send),
            KeyCode::Backspace => {
                let mut text = self.snapshot.composer.clone();
                text.pop()?;
                Some(Action::ComposerChanged(text))
            }
            KeyCode::Char(c) if !ctrl => {
                let mut text = self.snapshot.composer.clone();
                text.push(c);
                Some(Action::ComposerChanged(text))
            }
            KeyCode::PageUp => Some(Action::ScrollUp(PAGE)),
            KeyCode::PageDown => Some(Action::ScrollDown(PAGE)),
            KeyCode::Up => Some(Action::ScrollUp(1)),
            KeyCode::Down => Some(Action::ScrollDown(1)),
            KeyCode::Home if ctrl => Some(Action::ScrollToTop),
            KeyCode::End if ctrl => Some(Action::ScrollToBottom),
            _ => None,
        }
    }
}

impl Component for ChatView {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Paste(text) => {
                let mut composer = self.snapshot.composer.clone();
                composer.push_str(text);
                Some(Action::ComposerChanged(composer))
            }
            _ => None,
        }
    }

    fn update(&mut self, action: &Action) {
        match action {
            Action::ScrollUp(n) => self.scroll_up(*n),
            Action::ScrollDown(n) => self.scroll_down(*n),
            Action::ScrollToTop => self.scroll_to_top(),
            Action::ScrollToBottom => self.scroll_to_bottom(),
            Action::Tick => {
                self.tick_spinner();
            }
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(self.state_panel_height()),
                Constraint::Length(COMPOSER_HEIGHT),
            ])
            .split(area);

        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let title = if self.auto_scroll {
            " Conversation "
        } else {
            " Conversation (scrolled) "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(chunks[0]);
        self.visible_height = inner.height;

        // Scroll bounds are in wrapped rows, not logical lines.
        let transcript = Paragraph::new(self.transcript_lines()).wrap(Wrap { trim: false });
        self.line_count = transcript.line_count(inner.width);
        if self.auto_scroll {
            self.scroll_offset = self.max_offset();
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_offset());
        }

        let transcript = transcript.block(block).scroll((self.scroll_offset, 0));
        frame.render_widget(transcript, chunks[0]);

        if self.line_count > self.visible_height as usize {
            let mut scrollbar_state = ScrollbarState::new(self.max_offset() as usize)
                .position(self.scroll_offset as usize);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                inner,
                &mut scrollbar_state,
            );
        }

        if chunks[1].height > 0 {
            let state_lines = self.state_lines();
            let body = if state_lines.is_empty() {
                vec![Line::styled(
                    "No state inferred yet",
                    Style::default().fg(Color::DarkGray),
                )]
            } else {
                state_lines
            };
            let state = Paragraph::new(body).block(
                Block::default()
                    .title(self.state_title())
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
            frame.render_widget(state, chunks[1]);
        }

        let composer = Paragraph::new(self.snapshot.composer.clone()).block(
            Block::default()
                .title(self.composer_title())
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(composer, chunks[2]);
    }
}

fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}
