use crate::channel::{decode_frame, InboundEvent};
use crate::chat::ChatViewState;
use crate::error::Result;

/// Anything that can drive the view state: a raw inbound frame from the
/// channel or a user gesture forwarded by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Frame(String),
    Send(String),
    Feedback(bool),
}

/// Dispatches inputs to a [`ChatViewState`] one at a time.
pub struct Session {
    view: ChatViewState,
    skipped_frames: usize,
}

impl Session {
    pub fn new(view: ChatViewState) -> Self {
        Self {
            view,
            skipped_frames: 0,
        }
    }

    pub fn view(&self) -> &ChatViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ChatViewState {
        &mut self.view
    }

    pub fn skipped_frames(&self) -> usize {
        self.skipped_frames
    }

    pub fn dispatch(&mut self, event: InboundEvent) {
        tracing::trace!(event = event.name(), "Dispatching inbound event");
        match event {
            InboundEvent::Message(msg) => self.view.on_message(msg),
            InboundEvent::State(state) => self.view.on_state(state),
            InboundEvent::StateUpdateAccuracy(update) => self.view.on_accuracy_update(update),
        }
    }

    /// Decodes and applies one frame. Undecodable frames are skipped.
    pub fn apply_frame(&mut self, line: &str) -> Result<()> {
        match decode_frame(line) {
            Ok(event) => {
                self.dispatch(event);
                Ok(())
            }
            Err(e) => {
                self.skipped_frames += 1;
                Err(e)
            }
        }
    }

    pub fn handle(&mut self, input: SessionInput) {
        match input {
            SessionInput::Frame(line) => {
                if let Err(e) = self.apply_frame(&line) {
                    tracing::warn!("Skipping inbound frame: {}", e);
                }
            }
            SessionInput::Send(text) => {
                self.view.set_composer(text);
                self.view.send_composer();
            }
            SessionInput::Feedback(positive) => self.view.submit_feedback(positive),
        }
    }
}
