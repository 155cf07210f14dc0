use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;

use super::app_state::{Mode, TuiState};
use super::{cards_widget, collections_widget, form_widget, learning_widget, status_bar};

pub fn draw(f: &mut Frame, state: &TuiState) {
    let size = f.area();

    // Main layout: panels + status bar
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(size);

    let main_area = outer[0];
    let status_area = outer[1];

    // Horizontal split: collections (25%) | cards (75%)
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(main_area);

    collections_widget::draw(f, panels[0], state);

    if state.mode == Mode::Learning {
        learning_widget::draw(f, panels[1], state);
    } else {
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(3)])
            .split(panels[1]);
        form_widget::draw(f, right[0], state);
        cards_widget::draw(f, right[1], state);
    }

    status_bar::draw(f, status_area, state);
}
