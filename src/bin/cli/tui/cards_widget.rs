use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};

use super::app_state::{Mode, TuiState};

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let is_active = state.mode == Mode::Cards;
    let cards = state.session.cards();

    let title = match state.session.active_collection() {
        Some(name) => format!(" {} ({} cards) ", name, cards.len()),
        None => " Cards ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    if cards.is_empty() {
        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No cards in this collection yet.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "  Press a to add one.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(help_text).block(block), area);
        return;
    }

    let editing = state.session.form().editing.as_deref();
    let rows: Vec<Row> = cards
        .iter()
        .map(|card| {
            let row = Row::new(vec![card.term.clone(), card.definition.clone()]);
            if editing == Some(card.id.as_str()) {
                row.style(Style::default().fg(Color::Yellow))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Percentage(35), Constraint::Percentage(65)],
    )
    .header(
        Row::new(vec!["Term", "Definition"])
            .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(if is_active { Color::DarkGray } else { Color::Black })
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

    let mut table_state = TableState::default();
    table_state.select(Some(state.card_selected));

    f.render_stateful_widget(table, area, &mut table_state);
}
