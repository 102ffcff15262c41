//! The trigger state machine behind the mention picker.
//!
//! ## State Flow
//!
//! ```text
//!            trigger char (cursor known)
//!   Idle ───────────────────────────────▶ Active ◀──┐ printable char / Backspace (filter non-empty)
//!    ▲                                      │  │     │ ArrowUp / ArrowDown / Enter (no candidates)
//!    │  Escape, Backspace (empty filter),    │  └─────┘
//!    │  outside click, focus lost,          │
//!    │  external edit                       │
//!    ├──────────────────────────────────────┤
//!    │  Enter / pointer selection           │
//!    └────────────── commit ◀───────────────┘
//! ```
//!
//! Transitions are pure: [`TriggerState::next`] never touches the document.
//! A commit is reported as [`TriggerEffect::Commit`], and the caller performs
//! the actual insertion.

use crate::key_event::{Key, KeyEvent};
use crate::utils;

/// The state of the current trigger session.
///
/// When `active` is `false` all other fields hold their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriggerState {
    pub active: bool,
    /// The characters typed after the trigger character.
    pub filter_text: String,
    /// Document offset of the trigger character at activation time.
    pub anchor_position: usize,
    /// Index of the highlighted candidate.
    pub selected_index: usize,
}

/// An input event that may drive a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerInput<'a> {
    Key(&'a KeyEvent),
    /// A candidate in the list was clicked.
    PointerSelect(usize),
    /// The pointer was pressed outside both the candidate list and the document.
    PointerOutside,
    FocusLost,
    /// The document was changed by something other than typing or mention insertion.
    ExternalEdit,
}

/// What the state machine needs to know about the world to make a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerContext {
    pub trigger: char,
    /// The document's cursor offset, if it has a selection.
    pub cursor: Option<usize>,
    /// The number of candidates matching the current filter text.
    pub candidate_count: usize,
}

/// Why a trigger session ended without a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Escape,
    Backspace,
    PointerOutside,
    FocusLost,
    ExternalEdit,
}

/// The observable outcome of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEffect {
    /// The input was not meant for the state machine.
    Ignored,
    /// A new trigger session started at the given anchor.
    Activated { anchor_position: usize },
    FilterChanged,
    SelectionMoved,
    /// Enter was pressed while no candidate matched; the session stays open.
    NothingToCommit,
    Cancelled(CancelReason),
    /// The candidate at `index` should replace the trigger span.
    Commit {
        index: usize,
        anchor_position: usize,
        filter_text: String,
    },
}

/// How the document engine should treat the key that caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The state machine did not use the key.
    PassThrough,
    /// The state machine used the key, and the engine still applies its default behavior.
    Consumed,
    /// The engine must not apply its default behavior for this key.
    Suppressed,
}

/// The result of [`TriggerState::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TriggerState,
    pub effect: TriggerEffect,
    pub disposition: KeyDisposition,
}

impl Transition {
    fn new(state: TriggerState, effect: TriggerEffect, disposition: KeyDisposition) -> Self {
        Self { state, effect, disposition }
    }
}

impl TriggerState {
    /// Returns a freshly activated state anchored at `anchor_position`.
    pub fn activated(anchor_position: usize) -> Self {
        Self {
            active: true,
            filter_text: String::new(),
            anchor_position,
            selected_index: 0,
        }
    }

    /// Computes the transition for `input`, leaving `self` untouched.
    pub fn next(&self, input: TriggerInput<'_>, cx: &TriggerContext) -> Transition {
        match input {
            TriggerInput::Key(event) => self.next_for_key(event, cx),
            TriggerInput::PointerSelect(index) if self.active && index < cx.candidate_count => {
                self.commit(index, KeyDisposition::PassThrough)
            }
            TriggerInput::PointerSelect(_) => self.unchanged(TriggerEffect::Ignored, KeyDisposition::PassThrough),
            TriggerInput::PointerOutside => self.cancel(CancelReason::PointerOutside, KeyDisposition::PassThrough),
            TriggerInput::FocusLost => self.cancel(CancelReason::FocusLost, KeyDisposition::PassThrough),
            TriggerInput::ExternalEdit => self.cancel(CancelReason::ExternalEdit, KeyDisposition::PassThrough),
        }
    }

    fn next_for_key(&self, event: &KeyEvent, cx: &TriggerContext) -> Transition {
        let printable = event.printable_char();

        // The trigger character (re)starts a session even while one is active.
        if printable == Some(cx.trigger) {
            return match cx.cursor {
                Some(anchor_position) => Transition::new(
                    TriggerState::activated(anchor_position),
                    TriggerEffect::Activated { anchor_position },
                    KeyDisposition::Consumed,
                ),
                None => self.unchanged(TriggerEffect::Ignored, KeyDisposition::PassThrough),
            };
        }

        if !self.active {
            return self.unchanged(TriggerEffect::Ignored, KeyDisposition::PassThrough);
        }

        if let Some(c) = printable {
            let mut state = self.clone();
            state.filter_text.push(c);
            state.selected_index = 0;
            return Transition::new(state, TriggerEffect::FilterChanged, KeyDisposition::Consumed);
        }

        match event.key {
            Key::Backspace if self.filter_text.is_empty() => {
                self.cancel(CancelReason::Backspace, KeyDisposition::Consumed)
            }
            Key::Backspace => {
                let mut state = self.clone();
                utils::pop_grapheme(&mut state.filter_text);
                state.selected_index = 0;
                Transition::new(state, TriggerEffect::FilterChanged, KeyDisposition::Consumed)
            }
            Key::ArrowDown => {
                let mut state = self.clone();
                let last = cx.candidate_count.saturating_sub(1);
                state.selected_index = (self.selected_index + 1).min(last);
                Transition::new(state, TriggerEffect::SelectionMoved, KeyDisposition::Suppressed)
            }
            Key::ArrowUp => {
                let mut state = self.clone();
                state.selected_index = self.selected_index.saturating_sub(1);
                Transition::new(state, TriggerEffect::SelectionMoved, KeyDisposition::Suppressed)
            }
            Key::Enter if cx.candidate_count > 0 => {
                let index = self.selected_index.min(cx.candidate_count - 1);
                self.commit(index, KeyDisposition::Suppressed)
            }
            Key::Enter => self.unchanged(TriggerEffect::NothingToCommit, KeyDisposition::Suppressed),
            Key::Escape => self.cancel(CancelReason::Escape, KeyDisposition::Consumed),
            _ => self.unchanged(TriggerEffect::Ignored, KeyDisposition::PassThrough),
        }
    }

    fn unchanged(&self, effect: TriggerEffect, disposition: KeyDisposition) -> Transition {
        Transition::new(self.clone(), effect, disposition)
    }

    fn cancel(&self, reason: CancelReason, disposition: KeyDisposition) -> Transition {
        if !self.active {
            return self.unchanged(TriggerEffect::Ignored, KeyDisposition::PassThrough);
        }
        Transition::new(TriggerState::default(), TriggerEffect::Cancelled(reason), disposition)
    }

    fn commit(&self, index: usize, disposition: KeyDisposition) -> Transition {
        Transition::new(
            TriggerState::default(),
            TriggerEffect::Commit {
                index,
                anchor_position: self.anchor_position,
                filter_text: self.filter_text.clone(),
            },
            disposition,
        )
    }
}
