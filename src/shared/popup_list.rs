//! The candidate list shown below the caret while a mention is being typed.
//!
//! This is a pure view model: it decides what rows to show and which one is
//! highlighted, and turns clicks into [`CandidateListAction`]s. Drawing it is
//! left to the host UI.

use crate::entity_directory::Entity;

/// The text shown instead of rows when no entity matches the filter.
pub const NO_MATCHES_TEXT: &str = "No users found";

/// Where the popup's top-left corner goes, in the editing surface's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopupPosition {
    pub top: f64,
    pub left: f64,
}

/// Actions emitted by the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateListAction {
    /// The user clicked the candidate at the given row.
    Selected { index: usize, entity: Entity },
}

/// One row of the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRow<'a> {
    pub entity: &'a Entity,
    pub highlighted: bool,
}

/// What the popup should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateListContent<'a> {
    Rows(Vec<CandidateRow<'a>>),
    /// Nothing matched; show [`NO_MATCHES_TEXT`].
    NoMatches,
}

/// View model of the candidate popup.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateListView<'a> {
    candidates: Vec<&'a Entity>,
    selected_index: usize,
    position: Option<PopupPosition>,
}

impl<'a> CandidateListView<'a> {
    pub fn new(candidates: Vec<&'a Entity>, selected_index: usize, position: Option<PopupPosition>) -> Self {
        Self { candidates, selected_index, position }
    }

    /// Returns where the popup should be placed, if the caret could be located.
    pub fn position(&self) -> Option<PopupPosition> {
        self.position
    }

    pub fn candidates(&self) -> &[&'a Entity] {
        &self.candidates
    }

    pub fn content(&self) -> CandidateListContent<'a> {
        if self.candidates.is_empty() {
            return CandidateListContent::NoMatches;
        }
        CandidateListContent::Rows(
            self.candidates
                .iter()
                .enumerate()
                .map(|(i, entity)| CandidateRow { entity, highlighted: i == self.selected_index })
                .collect(),
        )
    }

    /// Handles a click on the row at `index`.
    pub fn click(&self, index: usize) -> Option<CandidateListAction> {
        self.candidates.get(index).map(|entity| CandidateListAction::Selected {
            index,
            entity: (*entity).clone(),
        })
    }

    /// Renders the list as text lines, marking the highlighted row with `>`.
    pub fn to_lines(&self) -> Vec<String> {
        match self.content() {
            CandidateListContent::NoMatches => vec![NO_MATCHES_TEXT.to_string()],
            CandidateListContent::Rows(rows) => rows
                .into_iter()
                .map(|row| {
                    let marker = if row.highlighted { '>' } else { ' ' };
                    format!("{marker} {}", row.entity.name)
                })
                .collect(),
        }
    }
}
