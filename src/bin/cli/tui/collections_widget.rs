use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use super::app_state::{Mode, TuiState};

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let is_active = state.mode == Mode::Collections;

    let block = Block::default()
        .title(" Collections ")
        .borders(Borders::ALL)
        .border_style(if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let current = state.session.active_collection();
    let items: Vec<ListItem> = state
        .session
        .collections()
        .iter()
        .map(|name| {
            if current == Some(name.as_str()) {
                ListItem::new(format!("\u{25b8} {}", name))
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(format!("  {}", name)).style(Style::default().fg(Color::White))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(if is_active { Color::DarkGray } else { Color::Black })
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.collection_selected));

    f.render_stateful_widget(list, area, &mut list_state);
}
