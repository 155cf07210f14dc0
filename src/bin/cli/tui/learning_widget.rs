use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::app_state::TuiState;

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let learning = state.session.learning();
    let (position, total) = learning.progress(state.session.cards().len());

    let block = Block::default()
        .title(format!(" Learning: card {} of {} ", position, total))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(card) = state.session.presented_card() else {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No card to show",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(placeholder, area);
        return;
    };

    let answer = if learning.answer_visible() {
        Line::from(Span::styled(
            card.definition.clone(),
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(
            "(Space to reveal)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    };

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            card.term.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        answer,
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(block);
    f.render_widget(paragraph, area);
}
