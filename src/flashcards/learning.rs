//! Learning mode: one card at a time with a hidden answer

use std::num::NonZeroUsize;

use super::models::Card;

/// Cursor over the loaded cards while in learning mode.
///
/// Navigation takes the card count as a [`NonZeroUsize`]; callers decide what
/// to do with an empty collection before asking the cycler to move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearningCycler {
    active: bool,
    index: usize,
    answer_visible: bool,
}

impl LearningCycler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn answer_visible(&self) -> bool {
        self.answer_visible
    }

    /// Enter learning mode at the first card. Refused for an empty collection.
    pub fn enter(&mut self, card_count: usize) -> bool {
        if card_count == 0 {
            return false;
        }
        self.active = true;
        self.reset();
        true
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.reset();
    }

    /// Back to the first card with the answer hidden
    pub fn reset(&mut self) {
        self.index = 0;
        self.answer_visible = false;
    }

    pub fn next(&mut self, card_count: NonZeroUsize) {
        self.index = (self.index + 1) % card_count.get();
        self.answer_visible = false;
    }

    pub fn previous(&mut self, card_count: NonZeroUsize) {
        let n = card_count.get();
        self.index = (self.index % n + n - 1) % n;
        self.answer_visible = false;
    }

    pub fn toggle_answer(&mut self) {
        self.answer_visible = !self.answer_visible;
    }

    /// Card under the cursor, `None` when the cursor is past the end
    pub fn current<'a>(&self, cards: &'a [Card]) -> Option<&'a Card> {
        cards.get(self.index)
    }

    /// One-based position and total, for "Card i of n"
    pub fn progress(&self, card_count: usize) -> (usize, usize) {
        (self.index + 1, card_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn cards(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card {
                id: format!("id{}", i),
                term: format!("term{}", i),
                definition: format!("def{}", i),
            })
            .collect()
    }

    #[test]
    fn test_enter_refused_when_empty() {
        let mut cycler = LearningCycler::new();
        assert!(!cycler.enter(0));
        assert!(!cycler.is_active());
    }

    #[test]
    fn test_enter_and_exit_reset_cursor() {
        let mut cycler = LearningCycler::new();
        assert!(cycler.enter(3));
        cycler.next(nz(3));
        cycler.toggle_answer();

        assert!(cycler.enter(3));
        assert_eq!(cycler.index(), 0);
        assert!(!cycler.answer_visible());

        cycler.next(nz(3));
        cycler.exit();
        assert!(!cycler.is_active());
        assert_eq!(cycler.index(), 0);
    }

    #[test]
    fn test_next_wraps_around() {
        for n in 2..6 {
            let mut cycler = LearningCycler::new();
            cycler.enter(n);
            for _ in 0..n {
                cycler.next(nz(n));
            }
            assert_eq!(cycler.index(), 0);
        }
    }

    #[test]
    fn test_previous_from_start_goes_to_last() {
        let mut cycler = LearningCycler::new();
        cycler.enter(4);
        cycler.previous(nz(4));
        assert_eq!(cycler.index(), 3);
        cycler.previous(nz(4));
        assert_eq!(cycler.index(), 2);
    }

    #[test]
    fn test_single_card_stays_put() {
        let mut cycler = LearningCycler::new();
        cycler.enter(1);
        cycler.next(nz(1));
        cycler.previous(nz(1));
        assert_eq!(cycler.index(), 0);
    }

    #[test]
    fn test_navigation_hides_answer() {
        let mut cycler = LearningCycler::new();
        cycler.enter(3);
        cycler.toggle_answer();
        assert!(cycler.answer_visible());
        assert_eq!(cycler.index(), 0);

        cycler.next(nz(3));
        assert!(!cycler.answer_visible());

        cycler.toggle_answer();
        cycler.previous(nz(3));
        assert!(!cycler.answer_visible());
    }

    #[test]
    fn test_previous_after_cards_shrank() {
        let mut cycler = LearningCycler::new();
        cycler.enter(5);
        for _ in 0..4 {
            cycler.next(nz(5));
        }
        cycler.previous(nz(2));
        assert_eq!(cycler.index(), 1);
    }

    #[test]
    fn test_current_card() {
        let deck = cards(2);
        let mut cycler = LearningCycler::new();
        cycler.enter(deck.len());
        assert_eq!(cycler.current(&deck).map(|c| c.id.as_str()), Some("id0"));
        cycler.previous(nz(deck.len()));
        assert_eq!(cycler.current(&deck).map(|c| c.id.as_str()), Some("id1"));
        assert_eq!(cycler.progress(deck.len()), (2, 2));
        assert!(cycler.current(&[]).is_none());
    }
}
