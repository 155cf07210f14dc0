use anyhow::Result;

use flashcards_lib::session::{Notice, PrimaryAction};
use flashcards_lib::StudySession;

use crate::app::App;

/// Form field being typed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Term,
    Definition,
    NewCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Collections,
    Cards,
    Input(Field),
    Learning,
}

pub struct TuiState {
    pub app: App,
    pub session: StudySession,
    pub mode: Mode,

    pub collection_selected: usize,
    pub card_selected: usize,

    pub flash_message: Option<String>,
    pub flash_is_error: bool,

    pub quit: bool,
}

impl TuiState {
    pub fn new(app: App) -> Result<Self> {
        let session = app.session();
        let mut state = Self {
            app,
            session,
            mode: Mode::Collections,
            collection_selected: 0,
            card_selected: 0,
            flash_message: None,
            flash_is_error: false,
            quit: false,
        };

        state.app.block_on(state.session.start());
        state.pick_up_notice();
        Ok(state)
    }

    /// Move the session's pending notice into the status bar
    fn pick_up_notice(&mut self) {
        match self.session.take_notice() {
            Some(Notice::Info(msg)) => {
                self.flash_message = Some(msg);
                self.flash_is_error = false;
            }
            Some(Notice::Error(msg)) => {
                self.flash_message = Some(msg);
                self.flash_is_error = true;
            }
            None => {}
        }
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.flash_message = Some(msg.into());
        self.flash_is_error = false;
    }

    fn sync_collection_cursor(&mut self) {
        if let Some(active) = self.session.active_collection() {
            if let Some(pos) = self.session.collections().iter().position(|n| n == active) {
                self.collection_selected = pos;
            }
        }
        self.card_selected = 0;
    }

    fn clamp_card_cursor(&mut self) {
        let len = self.session.cards().len();
        if self.card_selected >= len {
            self.card_selected = len.saturating_sub(1);
        }
    }

    // ===== Collections panel =====

    pub fn collection_move_down(&mut self) {
        let len = self.session.collections().len();
        if len > 0 && self.collection_selected < len - 1 {
            self.collection_selected += 1;
        }
    }

    pub fn collection_move_up(&mut self) {
        self.collection_selected = self.collection_selected.saturating_sub(1);
    }

    pub fn open_selected_collection(&mut self) {
        let Some(name) = self.session.collections().get(self.collection_selected).cloned() else {
            return;
        };
        self.app.block_on(self.session.select_collection(&name));
        self.card_selected = 0;
        self.pick_up_notice();
        self.mode = Mode::Cards;
    }

    pub fn begin_new_collection(&mut self) {
        self.session.set_new_collection(String::new());
        self.mode = Mode::Input(Field::NewCollection);
    }

    pub fn remove_selected_collection(&mut self) {
        let Some(name) = self.session.collections().get(self.collection_selected).cloned() else {
            return;
        };
        self.app.block_on(self.session.remove_collection(&name));
        self.sync_collection_cursor();
        self.pick_up_notice();
    }

    // ===== Cards panel =====

    pub fn card_move_down(&mut self) {
        let len = self.session.cards().len();
        if len > 0 && self.card_selected < len - 1 {
            self.card_selected += 1;
        }
    }

    pub fn card_move_up(&mut self) {
        self.card_selected = self.card_selected.saturating_sub(1);
    }

    fn selected_card_id(&self) -> Option<String> {
        self.session
            .cards()
            .get(self.card_selected)
            .map(|c| c.id.clone())
    }

    pub fn begin_add(&mut self) {
        self.session.cancel_edit();
        self.mode = Mode::Input(Field::Term);
    }

    pub fn begin_edit_selected(&mut self) {
        if let Some(id) = self.selected_card_id() {
            if self.session.begin_edit(&id) {
                self.mode = Mode::Input(Field::Term);
            }
        }
    }

    pub fn delete_selected_card(&mut self) {
        let Some(id) = self.selected_card_id() else {
            return;
        };
        if self.app.block_on(self.session.delete_card(&id)) {
            self.flash("Card deleted");
        }
        self.clamp_card_cursor();
        self.pick_up_notice();
    }

    // ===== Form =====

    pub fn input_push(&mut self, c: char) {
        let Mode::Input(field) = self.mode else {
            return;
        };
        let form = self.session.form();
        match field {
            Field::Term => {
                let mut term = form.term.clone();
                term.push(c);
                self.session.set_term(term);
            }
            Field::Definition => {
                let mut definition = form.definition.clone();
                definition.push(c);
                self.session.set_definition(definition);
            }
            Field::NewCollection => {
                let mut name = form.new_collection.clone();
                name.push(c);
                self.session.set_new_collection(name);
            }
        }
    }

    pub fn input_pop(&mut self) {
        let Mode::Input(field) = self.mode else {
            return;
        };
        let form = self.session.form();
        match field {
            Field::Term => {
                let mut term = form.term.clone();
                term.pop();
                self.session.set_term(term);
            }
            Field::Definition => {
                let mut definition = form.definition.clone();
                definition.pop();
                self.session.set_definition(definition);
            }
            Field::NewCollection => {
                let mut name = form.new_collection.clone();
                name.pop();
                self.session.set_new_collection(name);
            }
        }
    }

    pub fn switch_field(&mut self) {
        self.mode = match self.mode {
            Mode::Input(Field::Term) => Mode::Input(Field::Definition),
            Mode::Input(Field::Definition) => Mode::Input(Field::Term),
            other => other,
        };
    }

    /// Enter in a form field: look up, save, or add the collection
    pub fn commit_input(&mut self) {
        match self.mode {
            Mode::Input(Field::NewCollection) => {
                if self.app.block_on(self.session.add_collection()) {
                    self.sync_collection_cursor();
                    self.mode = Mode::Cards;
                } else {
                    self.flash("Name is blank, reserved or already taken");
                }
                self.pick_up_notice();
            }
            Mode::Input(_) => {
                let action = self.session.primary_action();
                let was_editing = self.session.form().editing.is_some();
                let done = self.app.block_on(self.session.submit());
                match action {
                    PrimaryAction::Lookup => {
                        self.mode = Mode::Input(Field::Definition);
                    }
                    PrimaryAction::Save => {
                        if done {
                            self.flash(if was_editing { "Card updated" } else { "Card added" });
                            self.card_selected = self.session.cards().len().saturating_sub(1);
                            if was_editing {
                                self.mode = Mode::Cards;
                            } else {
                                self.mode = Mode::Input(Field::Term);
                            }
                        } else if self.session.form().term.is_empty() {
                            // Store write failed, form already cleared
                            self.mode = Mode::Input(Field::Term);
                        }
                    }
                }
                self.pick_up_notice();
            }
            _ => {}
        }
    }

    pub fn cancel_input(&mut self) {
        match self.mode {
            Mode::Input(Field::NewCollection) => {
                self.session.set_new_collection(String::new());
                self.mode = Mode::Collections;
            }
            Mode::Input(_) => {
                self.session.cancel_edit();
                self.mode = Mode::Cards;
            }
            _ => {}
        }
    }

    // ===== Learning mode =====

    pub fn start_learning(&mut self) {
        if self.session.start_learning() {
            self.mode = Mode::Learning;
        }
        self.pick_up_notice();
    }

    pub fn stop_learning(&mut self) {
        self.session.stop_learning();
        self.mode = Mode::Cards;
    }
}
