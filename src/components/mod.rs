pub mod chat_view;
pub mod spinner;

use crossterm::event::Event;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;

pub use chat_view::ChatView;

pub trait Component {
    fn handle_event(&mut self, event: &Event) -> Option<Action>;

    fn update(&mut self, action: &Action);

    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool);
}
