mod event_loop;
mod replay;

pub use replay::run_headless;

use std::io::{self, Stdout};

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::action::Action;
use crate::components::{ChatView, Component};
use crate::error::{ChatError, Result};
use crate::session::Session;

/// Interactive terminal front end: owns the terminal, the session and the view.
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    session: Session,
    view: ChatView,
    should_quit: bool,
    needs_redraw: bool,
}

impl App {
    pub fn new(session: Session) -> Result<Self> {
        enable_raw_mode().map_err(|e| ChatError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .map_err(|e| ChatError::Terminal(e.to_string()))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| ChatError::Terminal(e.to_string()))?;

        let mut view = ChatView::new(session.view().features());
        view.set_snapshot(session.view().snapshot());

        Ok(Self {
            terminal,
            session,
            view,
            should_quit: false,
            needs_redraw: true,
        })
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ComposerChanged(text) => self.session.view_mut().set_composer(text),
            Action::Send => self.session.view_mut().send_composer(),
            Action::Feedback(positive) => self.session.view_mut().submit_feedback(positive),
            other => {
                self.view.update(&other);
                self.needs_redraw = true;
            }
        }
    }

    /// Paints the view, then honours any scroll request raised since the
    /// previous frame now that the new layout is known.
    fn draw(&mut self) -> Result<()> {
        self.paint()?;
        if self.session.view_mut().on_render_complete() {
            self.view.scroll_to_bottom();
            self.paint()?;
        }
        Ok(())
    }

    fn paint(&mut self) -> Result<()> {
        let view = &mut self.view;
        self.terminal
            .draw(|frame| view.render(frame, frame.area(), true))
            .map_err(|e| ChatError::Terminal(e.to_string()))?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
    }
}
