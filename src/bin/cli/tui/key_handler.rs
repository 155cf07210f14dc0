use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app_state::{Mode, TuiState};

pub fn handle_key(state: &mut TuiState, key: KeyEvent) {
    // Clear flash message on any keypress
    state.flash_message = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.quit = true;
        return;
    }

    match state.mode {
        Mode::Collections => handle_collections_key(state, key),
        Mode::Cards => handle_cards_key(state, key),
        Mode::Input(_) => handle_input_key(state, key),
        Mode::Learning => handle_learning_key(state, key),
    }
}

fn handle_collections_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Char('j') | KeyCode::Down => state.collection_move_down(),
        KeyCode::Char('k') | KeyCode::Up => state.collection_move_up(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => {
            state.open_selected_collection();
        }
        KeyCode::Tab => state.mode = Mode::Cards,
        KeyCode::Char('n') => state.begin_new_collection(),
        KeyCode::Char('D') => state.remove_selected_collection(),
        _ => {}
    }
}

fn handle_cards_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Char('j') | KeyCode::Down => state.card_move_down(),
        KeyCode::Char('k') | KeyCode::Up => state.card_move_up(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Tab | KeyCode::Esc => {
            state.mode = Mode::Collections;
        }
        KeyCode::Char('a') => state.begin_add(),
        KeyCode::Char('e') | KeyCode::Enter => state.begin_edit_selected(),
        KeyCode::Char('d') => state.delete_selected_card(),
        KeyCode::Char('L') | KeyCode::Char(' ') => state.start_learning(),
        _ => {}
    }
}

fn handle_input_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.cancel_input(),
        KeyCode::Enter => state.commit_input(),
        KeyCode::Tab | KeyCode::BackTab => state.switch_field(),
        KeyCode::Backspace => state.input_pop(),
        KeyCode::Char(c) => state.input_push(c),
        _ => {}
    }
}

fn handle_learning_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => state.stop_learning(),
        KeyCode::Char(' ') | KeyCode::Enter => state.session.toggle_answer(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('n') => state.session.next_card(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('p') => state.session.previous_card(),
        _ => {}
    }
}
