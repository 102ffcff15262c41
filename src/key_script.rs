//! A tiny script language for replaying editing sessions.
//!
//! Plain characters are typed as-is. Named keys and pointer events go in braces:
//! `{Enter}`, `{Esc}`, `{Up}`, `{Down}`, `{Left}`, `{Right}`, `{Tab}`,
//! `{Backspace}`, `{Click:N}` (click the Nth candidate) and `{Outside}`
//! (click outside the editor). `{{` types a literal `{`.

use thiserror::Error;

use crate::key_event::{Key, KeyEvent};

/// A single step of a replayed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Key(KeyEvent),
    /// Click the candidate at this row of the popup.
    Click(usize),
    /// Press the pointer outside both the popup and the document.
    Outside,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyScriptError {
    #[error("unknown key {{{0}}} at position {1}")]
    UnknownKey(String, usize),
    #[error("unterminated '{{' at position {0}")]
    Unterminated(usize),
    #[error("invalid candidate index {0:?} at position {1}")]
    InvalidIndex(String, usize),
}

/// Parses a key script into steps.
pub fn parse_key_script(script: &str) -> Result<Vec<ScriptStep>, KeyScriptError> {
    let mut steps = Vec::new();
    let mut chars = script.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        if c != '{' {
            steps.push(ScriptStep::Key(KeyEvent::char(c)));
            continue;
        }
        if chars.next_if(|&(_, next)| next == '{').is_some() {
            steps.push(ScriptStep::Key(KeyEvent::char('{')));
            continue;
        }
        let mut name = String::new();
        let mut terminated = false;
        for (_, next) in chars.by_ref() {
            if next == '}' {
                terminated = true;
                break;
            }
            name.push(next);
        }
        if !terminated {
            return Err(KeyScriptError::Unterminated(position));
        }
        steps.push(parse_named_step(&name, position)?);
    }
    Ok(steps)
}

fn parse_named_step(name: &str, position: usize) -> Result<ScriptStep, KeyScriptError> {
    if let Some(index) = name.strip_prefix("Click:") {
        return index
            .trim()
            .parse()
            .map(ScriptStep::Click)
            .map_err(|_| KeyScriptError::InvalidIndex(index.to_string(), position));
    }
    let key = match name {
        "Enter" => Key::Enter,
        "Esc" | "Escape" => Key::Escape,
        "Up" => Key::ArrowUp,
        "Down" => Key::ArrowDown,
        "Left" => Key::ArrowLeft,
        "Right" => Key::ArrowRight,
        "Tab" => Key::Tab,
        "Backspace" => Key::Backspace,
        "Outside" => return Ok(ScriptStep::Outside),
        other => return Err(KeyScriptError::UnknownKey(other.to_string(), position)),
    };
    Ok(ScriptStep::Key(KeyEvent::new(key)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_script() {
        let steps = parse_key_script("@J{Down}{Enter}{{{Click:2}{Outside}").unwrap();
        assert_eq!(
            steps,
            [
                ScriptStep::Key(KeyEvent::char('@')),
                ScriptStep::Key(KeyEvent::char('J')),
                ScriptStep::Key(KeyEvent::new(Key::ArrowDown)),
                ScriptStep::Key(KeyEvent::new(Key::Enter)),
                ScriptStep::Key(KeyEvent::char('{')),
                ScriptStep::Click(2),
                ScriptStep::Outside,
            ],
        );
    }

    #[test]
    fn test_parse_key_script_errors() {
        assert_eq!(parse_key_script("ab{Nope}"), Err(KeyScriptError::UnknownKey("Nope".into(), 2)));
        assert_eq!(parse_key_script("{Enter"), Err(KeyScriptError::Unterminated(0)));
        assert_eq!(parse_key_script("{Click:x}"), Err(KeyScriptError::InvalidIndex("x".into(), 0)));
    }
}
