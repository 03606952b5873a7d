pub mod frame;

pub use frame::{
    decode_frame, encode_frame, AccuracyUpdate, InboundEvent, MessageEvent, OutboundEvent,
    StateEvent, StatePair,
};

use tokio::sync::mpsc;

/// Upstream half of the channel as seen by the view state.
///
/// Emission is fire-and-forget: a closed transport is logged, never surfaced.
pub trait Channel: Send {
    fn emit(&self, event: OutboundEvent);
}

/// Channel backed by a tokio unbounded sender; the transport owns the receiver.
pub struct MpscChannel {
    tx: mpsc::UnboundedSender<OutboundEvent>,
}

impl MpscChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Channel for MpscChannel {
    fn emit(&self, event: OutboundEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            tracing::warn!("Dropped outbound '{}' event: channel closed", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpsc_channel_delivers_in_order() {
        let (channel, mut rx) = MpscChannel::new();
        channel.emit(OutboundEvent::Message { query: "a".into() });
        channel.emit(OutboundEvent::StateUpdateFeedback { positive: true });

        assert_eq!(rx.try_recv().unwrap(), OutboundEvent::Message { query: "a".into() });
        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundEvent::StateUpdateFeedback { positive: true }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_receiver_dropped_does_not_panic() {
        let (channel, rx) = MpscChannel::new();
        drop(rx);
        channel.emit(OutboundEvent::Message { query: "lost".into() });
    }
}
