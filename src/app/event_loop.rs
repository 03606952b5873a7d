use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;

use super::App;
use crate::action::Action;
use crate::channel::{encode_frame, OutboundEvent};
use crate::components::Component;
use crate::error::{ChatError, Result};
use crate::session::SessionInput;

const TICK_INTERVAL: Duration = Duration::from_millis(80);

impl App {
    /// Runs until the user quits. Script inputs, terminal events, outbound
    /// frames and state revisions are handled one at a time.
    pub async fn run(
        &mut self,
        mut inputs: mpsc::UnboundedReceiver<SessionInput>,
        mut outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    ) -> Result<()> {
        let mut events = EventStream::new();
        let mut revisions = self.session.view().subscribe();
        let mut tick = tokio::time::interval(TICK_INTERVAL);
        let mut inputs_open = true;

        self.draw()?;

        while !self.should_quit {
            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Resize(_, _))) => self.needs_redraw = true,
                    Some(Ok(event)) => {
                        if let Some(action) = self.view.handle_event(&event) {
                            self.dispatch(action);
                        }
                    }
                    Some(Err(e)) => return Err(ChatError::Terminal(e.to_string())),
                    None => self.should_quit = true,
                },
                input = inputs.recv(), if inputs_open => match input {
                    Some(input) => self.session.handle(input),
                    None => {
                        inputs_open = false;
                        tracing::info!(
                            skipped = self.session.skipped_frames(),
                            "Replay script finished"
                        );
                    }
                },
                Some(event) = outbound.recv() => match encode_frame(&event) {
                    Ok(frame) => tracing::info!(%frame, "Outbound frame"),
                    Err(e) => tracing::warn!("Failed to encode outbound frame: {}", e),
                },
                Ok(()) = revisions.changed() => {
                    self.view.set_snapshot(self.session.view().snapshot());
                    self.needs_redraw = true;
                }
                _ = tick.tick() => {
                    self.view.update(&Action::Tick);
                    if self.view.snapshot().progress.is_some() {
                        self.needs_redraw = true;
                    }
                }
            }

            if self.needs_redraw {
                self.needs_redraw = false;
                self.draw()?;
            }
        }

        Ok(())
    }
}
