#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Tick,

    /// New composer content after an edit.
    ComposerChanged(String),
    /// Send the current composer content.
    Send,
    /// Rate the inferred state.
    Feedback(bool),

    ScrollUp(u16),
    ScrollDown(u16),
    ScrollToTop,
    ScrollToBottom,
}
