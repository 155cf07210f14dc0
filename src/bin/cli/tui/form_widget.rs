use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use flashcards_lib::translate::Suggestion;

use super::app_state::{Field, Mode, TuiState};

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![Span::styled(label, label_style), Span::raw(value)];
    if focused {
        spans.push(Span::raw("\u{2588}"));
    }
    Line::from(spans)
}

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let form = state.session.form();
    let is_active = matches!(state.mode, Mode::Input(Field::Term | Field::Definition));

    let title = if form.editing.is_some() {
        " Edit card "
    } else {
        " New card "
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let suggestion = match &form.suggestion {
        Some(Suggestion::Found(text)) => Line::from(vec![
            Span::styled(" Suggestion: ", Style::default().fg(Color::DarkGray)),
            Span::styled(text.clone(), Style::default().fg(Color::Green)),
        ]),
        Some(other) => Line::from(Span::styled(
            format!(" {}", other),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(""),
    };

    let lines = vec![
        field_line(" Term:       ", &form.term, state.mode == Mode::Input(Field::Term)),
        field_line(
            " Definition: ",
            &form.definition,
            state.mode == Mode::Input(Field::Definition),
        ),
        suggestion,
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}
