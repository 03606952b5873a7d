use std::io::Write;

use tokio::sync::mpsc;

use crate::channel::{encode_frame, OutboundEvent};
use crate::components::ChatView;
use crate::error::Result;
use crate::session::{Session, SessionInput};

/// Replays inputs without a terminal. Each outbound frame is written as
/// `> <frame>` when emitted; the final view is written as plain text once the
/// inputs are exhausted.
pub async fn run_headless<W: Write>(
    session: &mut Session,
    mut inputs: mpsc::UnboundedReceiver<SessionInput>,
    mut outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    out: &mut W,
) -> Result<()> {
    while let Some(input) = inputs.recv().await {
        session.handle(input);
        while let Ok(event) = outbound.try_recv() {
            writeln!(out, "> {}", encode_frame(&event)?)?;
        }
        // Nothing is painted between steps, so scroll requests are moot.
        session.view_mut().on_render_complete();
    }

    if session.skipped_frames() > 0 {
        tracing::warn!(skipped = session.skipped_frames(), "Some frames could not be decoded");
    }

    let mut view = ChatView::new(session.view().features());
    view.set_snapshot(session.view().snapshot());
    for line in view.plain_text() {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MpscChannel;
    use crate::chat::clock::FixedClock;
    use crate::chat::{ChatViewState, Variant};
    use crate::script::parse_line;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = r#"
{"event":"message","data":{"type":"greeting","lines":["Hello Ada!","I'm your personal assistant to help you find the best flight"]}}
{"user":"send","text":"LHR to JFK"}
{"event":"message","data":{"type":"progress","text":"Searching flights"}}
{"event":"state","data":{"origin":[["LHR",0.91]],"destination":[["JFK",0.5],["EWR",0.33333]]}}
{"event":"message","data":{"type":"answer","lines":["Here are the 1 flights I could find:","BA117 LHR 08:25 → JFK 11:05"]}}
{"event":"stateUpdateAccuracy","data":{"accuracy":0.8}}
{"event":"bogus","data":{}}
{"user":"feedback","positive":true}
"#;

    async fn replay(variant: Variant) -> String {
        let (channel, outbound) = MpscChannel::new();
        let view = ChatViewState::new(variant, Box::new(channel), Box::new(FixedClock("12:00")));
        let mut session = Session::new(view);

        let (tx, inputs) = mpsc::unbounded_channel();
        for input in SCRIPT.lines().filter_map(parse_line) {
            tx.send(input).unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        run_headless(&mut session, inputs, outbound, &mut out)
            .await
            .unwrap();
        assert_eq!(session.skipped_frames(), 1);
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_full_replay_output() {
        let output = replay(Variant::Full).await;
        let expected = [
            r#"> {"event":"message","data":{"query":"LHR to JFK"}}"#,
            r#"> {"event":"stateUpdateFeedback","data":{"positive":true}}"#,
            "Assistant 12:00",
            "  Hello Ada!",
            "  I'm your personal assistant to help you find the best flight",
            "",
            "You 12:00",
            "  LHR to JFK",
            "",
            "Assistant 12:00",
            "  Here are the 1 flights I could find:",
            "  BA117 LHR 08:25 → JFK 11:05",
            "",
            "State · accuracy 0.800",
            "origin: LHR (0.910)",
            "destination: JFK (0.500) EWR (0.333)",
        ];
        assert_eq!(output.lines().collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn test_basic_replay_has_no_state_section() {
        let output = replay(Variant::Basic).await;
        assert!(!output.contains("State"));
        assert!(!output.contains("Accuracy"));
        assert!(output.contains("  BA117 LHR 08:25 → JFK 11:05"));
    }
}
