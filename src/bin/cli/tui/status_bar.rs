use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use flashcards_lib::session::PrimaryAction;

use super::app_state::{Field, Mode, TuiState};

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    // Show flash message if present
    if let Some(ref msg) = state.flash_message {
        let bg = if state.flash_is_error { Color::Red } else { Color::Green };
        let flash = Paragraph::new(format!(" {}", msg)).style(Style::default().bg(bg).fg(Color::Black));
        f.render_widget(flash, area);
        return;
    }

    if state.mode == Mode::Input(Field::NewCollection) {
        let text = format!(" New collection: {}\u{2588}", state.session.form().new_collection);
        let prompt = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
        f.render_widget(prompt, area);
        return;
    }

    let hints = match state.mode {
        Mode::Collections => {
            " j/k: navigate  Enter: open  n: new collection  D: remove  Tab: cards  q: quit "
        }
        Mode::Cards => {
            " j/k: navigate  a: add  e: edit  d: delete  Space: learn  Tab: collections  q: quit "
        }
        Mode::Input(_) => match state.session.primary_action() {
            PrimaryAction::Lookup => " Enter: look up  Tab: switch field  Esc: cancel ",
            PrimaryAction::Save => " Enter: save  Tab: switch field  Esc: cancel ",
        },
        Mode::Learning => " Space: show/hide answer  h/l: previous/next  Esc: stop learning ",
    };

    let status = Paragraph::new(hints).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status, area);
}
