pub mod clock;
pub mod state;
pub mod types;

pub use clock::{Clock, LocalClock};
pub use state::{ChatSnapshot, ChatViewState};
pub use types::{Features, Origin, ScoredValue, TranscriptEntry, Variant};
