/// The mention-aware text input controller.
pub mod mentionable_text_input;
/// The candidate popup shown while a mention is being typed.
pub mod popup_list;
/// The summary of mentions in the current content.
pub mod current_mentions;
