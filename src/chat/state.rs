use tokio::sync::watch;

use crate::channel::{AccuracyUpdate, Channel, MessageEvent, OutboundEvent, StateEvent};
use crate::chat::clock::Clock;
use crate::chat::types::{
    Features, Origin, ProgressIndicator, ScoredStateMap, ScoredValue, TranscriptEntry, Variant,
};

/// Point-in-time copy of everything the renderer paints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSnapshot {
    pub revision: u64,
    pub transcript: Vec<TranscriptEntry>,
    pub progress: Option<ProgressIndicator>,
    pub state: ScoredStateMap,
    pub feedback_eligible: bool,
    pub accuracy: Option<f64>,
    pub composer: String,
}

/// Client-side view state for one chat session.
///
/// Inbound events and user actions mutate the state; every mutation bumps a
/// revision published on a watch channel so renderers know to pull a fresh
/// [`ChatSnapshot`]. Scrolling is requested, not performed: the renderer
/// calls [`ChatViewState::on_render_complete`] after painting and scrolls
/// when it returns `true`.
pub struct ChatViewState {
    features: Features,
    channel: Box<dyn Channel>,
    clock: Box<dyn Clock>,
    transcript: Vec<TranscriptEntry>,
    progress: Option<ProgressIndicator>,
    state: ScoredStateMap,
    feedback_eligible: bool,
    accuracy: Option<f64>,
    composer: String,
    scroll_pending: bool,
    revision: u64,
    revision_tx: watch::Sender<u64>,
}

impl ChatViewState {
    pub fn new(variant: Variant, channel: Box<dyn Channel>, clock: Box<dyn Clock>) -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            features: variant.features(),
            channel,
            clock,
            transcript: Vec::new(),
            progress: None,
            state: ScoredStateMap::new(),
            feedback_eligible: false,
            accuracy: None,
            composer: String::new(),
            scroll_pending: false,
            revision: 0,
            revision_tx,
        }
    }

    /// Change notification: yields the new revision after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn progress(&self) -> Option<&ProgressIndicator> {
        self.progress.as_ref()
    }

    pub fn state(&self) -> &ScoredStateMap {
        &self.state
    }

    pub fn is_feedback_eligible(&self) -> bool {
        self.feedback_eligible
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    pub fn composer(&self) -> &str {
        &self.composer
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            revision: self.revision,
            transcript: self.transcript.clone(),
            progress: self.progress.clone(),
            state: self.state.clone(),
            feedback_eligible: self.feedback_eligible,
            accuracy: self.accuracy,
            composer: self.composer.clone(),
        }
    }

    pub fn on_message(&mut self, event: MessageEvent) {
        let timestamp = self.clock.timestamp();
        tracing::debug!(kind = ?event.kind, "Message received");

        if event.is_progress() {
            self.progress = Some(ProgressIndicator {
                timestamp,
                text: event.body(),
            });
        } else {
            let text = event.body();
            self.transcript.push(TranscriptEntry {
                origin: Origin::Other,
                timestamp,
                text,
                kind: event.kind,
                lines: event.lines,
            });
            self.progress = None;
            self.set_feedback_eligible(true);
        }

        self.scroll_pending = true;
        self.notify();
    }

    pub fn on_state(&mut self, event: StateEvent) {
        if !self.features.state_map {
            tracing::debug!("Ignoring state update: state map disabled");
            return;
        }

        let state: ScoredStateMap = event
            .0
            .into_iter()
            .map(|(key, pairs)| {
                let values = pairs
                    .iter()
                    .map(|pair| ScoredValue::new(pair.value_text(), pair.score()))
                    .collect();
                (key, values)
            })
            .collect();
        tracing::debug!(categories = state.len(), "User state updated");

        let has_state = !state.is_empty();
        self.state = state;
        self.set_feedback_eligible(has_state);
        self.notify();
    }

    pub fn on_accuracy_update(&mut self, event: AccuracyUpdate) {
        if !self.features.accuracy {
            tracing::debug!("Ignoring accuracy update: accuracy disabled");
            return;
        }

        tracing::debug!(accuracy = event.accuracy, "Updated state update accuracy");
        self.accuracy = Some(event.accuracy);
        self.notify();
    }

    /// Replaces the composer content; the renderer calls this as the user types.
    pub fn set_composer(&mut self, text: impl Into<String>) {
        self.composer = text.into();
        self.notify();
    }

    /// Sends `text` upstream and records it. Empty text is sent as is.
    pub fn send(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.channel.emit(OutboundEvent::Message {
            query: text.clone(),
        });
        self.transcript.push(TranscriptEntry {
            origin: Origin::Own,
            timestamp: self.clock.timestamp(),
            text,
            kind: None,
            lines: Vec::new(),
        });
        self.progress = None;
        self.scroll_pending = true;
        self.composer.clear();
        self.set_feedback_eligible(false);
        self.notify();
    }

    /// Sends the current composer content.
    pub fn send_composer(&mut self) {
        let text = std::mem::take(&mut self.composer);
        self.send(text);
    }

    /// Expected only while feedback is eligible; the renderer hides the
    /// controls otherwise, so no guard is applied here.
    pub fn submit_feedback(&mut self, positive: bool) {
        self.channel
            .emit(OutboundEvent::StateUpdateFeedback { positive });
        tracing::debug!(positive, "Sent state update feedback");
        self.set_feedback_eligible(false);
        self.notify();
    }

    /// Called by the renderer once a frame has been painted. Returns whether
    /// a scroll to the bottom was requested since the previous call.
    pub fn on_render_complete(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }

    fn set_feedback_eligible(&mut self, eligible: bool) {
        self.feedback_eligible = self.features.feedback && eligible;
    }

    fn notify(&mut self) {
        self.revision += 1;
        self.revision_tx.send_replace(self.revision);
    }
}
