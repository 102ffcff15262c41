//! MentionableTextInput adds @mention support on top of a rich-text document engine.
//!
//! The host UI forwards keyboard, pointer and focus events to a
//! [`MentionableTextInput`], which decides whether a trigger session is active,
//! what the candidate popup shows, and when a candidate replaces the typed
//! trigger span with a mention token.
//!
//! For every key press the host must:
//! 1. call [`MentionableTextInput::handle_key`] *before* the engine sees the key;
//! 2. let the engine apply its default behavior unless the returned
//!    [`KeyDisposition`] is [`KeyDisposition::Suppressed`];
//! 3. pass the engine's serialized content to
//!    [`MentionableTextInput::on_content_changed`] whenever it changed.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::DocumentEngine;
use crate::entity_directory::{Entity, EntityDirectory};
use crate::entity_search;
use crate::key_event::KeyEvent;
use crate::settings::MentionSettings;
use crate::shared::current_mentions::CurrentMentionsView;
use crate::shared::popup_list::{CandidateListAction, CandidateListView, PopupPosition};

pub mod insertion;
pub mod mention_utils;
pub mod trigger;

use self::insertion::InsertedMention;
use self::mention_utils::{ExtractedMention, MentionExtractor};
use self::trigger::{TriggerContext, TriggerEffect, TriggerInput, TriggerState};
pub use self::trigger::KeyDisposition;

/// The final content of the input together with the mentions it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub content: String,
    pub mentions: Vec<ExtractedMention>,
}

/// The mention-aware controller for a single editing surface.
#[derive(Debug)]
pub struct MentionableTextInput {
    directory: Arc<EntityDirectory>,
    settings: MentionSettings,
    extractor: MentionExtractor,
    state: TriggerState,
    /// Where the candidate popup goes, captured when the session started.
    popup_position: Option<PopupPosition>,
    /// The mentions found in the most recent content-changed event.
    current_mentions: Vec<ExtractedMention>,
}

impl MentionableTextInput {
    pub fn new(directory: Arc<EntityDirectory>, settings: MentionSettings) -> Self {
        let extractor = MentionExtractor::new(settings.trigger);
        Self {
            directory,
            settings,
            extractor,
            state: TriggerState::default(),
            popup_position: None,
            current_mentions: Vec::new(),
        }
    }

    pub fn trigger_state(&self) -> &TriggerState {
        &self.state
    }

    /// Returns `true` while a trigger session is active and the popup is shown.
    pub fn is_searching(&self) -> bool {
        self.state.active
    }

    /// Returns the entities matching the current filter text, in directory order.
    ///
    /// Empty while no trigger session is active.
    pub fn candidates(&self) -> Vec<&Entity> {
        if !self.state.active {
            return Vec::new();
        }
        self.candidates_for(&self.state.filter_text)
    }

    fn candidates_for(&self, filter_text: &str) -> Vec<&Entity> {
        entity_search::filter_entities_limited(&self.directory, filter_text, self.settings.max_visible_candidates)
    }

    /// Returns the candidate popup's view model, or `None` if the popup is hidden.
    pub fn candidate_list(&self) -> Option<CandidateListView<'_>> {
        self.state.active.then(|| {
            CandidateListView::new(self.candidates(), self.state.selected_index, self.popup_position)
        })
    }

    /// Returns the mentions found in the most recent content-changed event.
    pub fn current_mentions(&self) -> &[ExtractedMention] {
        &self.current_mentions
    }

    pub fn current_mentions_view(&self) -> CurrentMentionsView<'_, ExtractedMention> {
        CurrentMentionsView::new(&self.current_mentions)
    }

    /// Handles a key press before the document engine sees it.
    pub fn handle_key<D: DocumentEngine + ?Sized>(&mut self, doc: &mut D, event: &KeyEvent) -> KeyDisposition {
        self.apply(doc, TriggerInput::Key(event)).0
    }

    /// Commits the candidate at `index` in the current candidate list.
    pub fn select_candidate<D: DocumentEngine + ?Sized>(&mut self, doc: &mut D, index: usize) -> Option<InsertedMention> {
        self.apply(doc, TriggerInput::PointerSelect(index)).1
    }

    /// Handles an action emitted by the view returned from [`Self::candidate_list`].
    pub fn handle_candidate_list_action<D: DocumentEngine + ?Sized>(
        &mut self,
        doc: &mut D,
        action: &CandidateListAction,
    ) -> Option<InsertedMention> {
        match action {
            CandidateListAction::Selected { index, entity } => {
                let still_listed = self.candidates().get(*index).is_some_and(|c| c.id == entity.id);
                if !still_listed {
                    warn!("Ignoring selection of {:?}: the candidate list has changed.", entity.id);
                    return None;
                }
                self.select_candidate(doc, *index)
            }
        }
    }

    /// The pointer was pressed outside both the candidate list and the document.
    pub fn pointer_pressed_outside(&mut self) {
        self.apply_without_document(TriggerInput::PointerOutside);
    }

    /// The document lost keyboard focus.
    pub fn focus_lost(&mut self) {
        self.apply_without_document(TriggerInput::FocusLost);
    }

    /// The document was replaced or edited programmatically, so the trigger
    /// anchor may no longer point at the trigger character.
    pub fn on_external_edit(&mut self) {
        self.apply_without_document(TriggerInput::ExternalEdit);
    }

    /// Re-extracts the current mentions from the engine's serialized content.
    pub fn on_content_changed(&mut self, content: &str) -> &[ExtractedMention] {
        self.current_mentions = self.extractor.extract(content);
        &self.current_mentions
    }

    /// Extracts the final set of mentions from `content` for submission.
    pub fn submit(&self, content: &str) -> Submission {
        Submission {
            content: content.to_string(),
            mentions: self.extractor.extract(content),
        }
    }

    fn apply_without_document(&mut self, input: TriggerInput<'_>) {
        let cx = TriggerContext {
            trigger: self.settings.trigger,
            cursor: None,
            candidate_count: 0,
        };
        let transition = self.state.next(input, &cx);
        debug_assert!(!matches!(transition.effect, TriggerEffect::Commit { .. }));
        self.finish(transition.state, &transition.effect);
    }

    fn apply<D: DocumentEngine + ?Sized>(
        &mut self,
        doc: &mut D,
        input: TriggerInput<'_>,
    ) -> (KeyDisposition, Option<InsertedMention>) {
        let cx = TriggerContext {
            trigger: self.settings.trigger,
            cursor: doc.cursor_position(),
            candidate_count: self.candidates().len(),
        };
        let transition = self.state.next(input, &cx);
        let mut inserted = None;
        #[cfg(feature = "log_trigger_transitions")]
        debug!("Trigger transition on {input:?}: {:?} -> {transition:?}", self.state);

        match &transition.effect {
            TriggerEffect::Activated { anchor_position } => {
                self.popup_position = doc.bounds_at(*anchor_position).map(|bounds| PopupPosition {
                    top: bounds.top + bounds.height + self.settings.popup_offset,
                    left: bounds.left,
                });
                debug!("Mention search started at offset {anchor_position}, popup at {:?}", self.popup_position);
            }
            TriggerEffect::Commit { index, anchor_position, filter_text } => {
                let entity = self.candidates_for(filter_text).get(*index).map(|e| (*e).clone());
                inserted = match entity {
                    Some(entity) => insertion::insert_mention(doc, &entity, *anchor_position, filter_text, &self.settings),
                    None => {
                        warn!("No candidate at index {index} for filter {filter_text:?}");
                        None
                    }
                };
            }
            _ => {}
        }
        self.finish(transition.state, &transition.effect);
        (transition.disposition, inserted)
    }

    fn finish(&mut self, state: TriggerState, effect: &TriggerEffect) {
        if let TriggerEffect::Cancelled(reason) = effect {
            debug!("Mention search cancelled: {reason:?}");
        }
        if !state.active {
            self.popup_position = None;
        }
        self.state = state;
    }
}
