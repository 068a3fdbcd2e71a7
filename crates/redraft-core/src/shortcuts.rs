//! Keyboard shortcuts.
//!
//! Platform code converts native key events into [`KeyInput`]; what a key
//! does depends on which overlay is open.

/// Modifier key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const ALT: Self = Self {
        ctrl: false,
        alt: true,
        shift: false,
        meta: false,
    };
}

/// A keydown, reduced to what the bindings look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// The `KeyboardEvent.key` value.
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn alt(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::ALT)
    }

    fn is_char(&self, c: char) -> bool {
        let mut chars = self.key.chars();
        chars.next().is_some_and(|k| k.eq_ignore_ascii_case(&c)) && chars.next().is_none()
    }
}

/// Which overlay currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Review,
    InstructionBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TriggerReplace,
    OpenInstructionBox,
    Accept,
    Reject,
    SubmitInstruction,
    CloseInstructionBox,
}

/// Command bound to `input` in the given overlay. A hit should prevent the
/// event's default action.
pub fn match_shortcut(input: &KeyInput, overlay: Overlay) -> Option<Command> {
    match overlay {
        Overlay::InstructionBox => match input.key.as_str() {
            "Enter" if !input.modifiers.shift => Some(Command::SubmitInstruction),
            "Escape" => Some(Command::CloseInstructionBox),
            _ => None,
        },
        Overlay::Review => match input.key.as_str() {
            "Enter" => Some(Command::Accept),
            "Escape" => Some(Command::Reject),
            _ => None,
        },
        Overlay::None if input.modifiers == Modifiers::ALT => {
            if input.is_char('q') {
                Some(Command::TriggerReplace)
            } else if input.is_char('x') {
                Some(Command::OpenInstructionBox)
            } else {
                None
            }
        }
        Overlay::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_bindings() {
        assert_eq!(
            match_shortcut(&KeyInput::alt("q"), Overlay::None),
            Some(Command::TriggerReplace)
        );
        assert_eq!(
            match_shortcut(&KeyInput::alt("X"), Overlay::None),
            Some(Command::OpenInstructionBox)
        );
        assert_eq!(match_shortcut(&KeyInput::plain("q"), Overlay::None), None);
        assert_eq!(match_shortcut(&KeyInput::alt("z"), Overlay::None), None);
    }

    #[test]
    fn test_alt_alone() {
        let with = |m: Modifiers| KeyInput::new("q", m);
        for modifiers in [
            Modifiers { ctrl: true, ..Modifiers::ALT },
            Modifiers { meta: true, ..Modifiers::ALT },
            Modifiers { shift: true, ..Modifiers::ALT },
        ] {
            assert_eq!(match_shortcut(&with(modifiers), Overlay::None), None);
        }
    }

    #[test]
    fn test_review_keys() {
        assert_eq!(
            match_shortcut(&KeyInput::plain("Enter"), Overlay::Review),
            Some(Command::Accept)
        );
        assert_eq!(
            match_shortcut(&KeyInput::plain("Escape"), Overlay::Review),
            Some(Command::Reject)
        );
        // Global bindings are off while a review is open.
        assert_eq!(match_shortcut(&KeyInput::alt("q"), Overlay::Review), None);
    }

    #[test]
    fn test_instruction_box_keys() {
        assert_eq!(
            match_shortcut(&KeyInput::plain("Enter"), Overlay::InstructionBox),
            Some(Command::SubmitInstruction)
        );
        let shift_enter = KeyInput::new(
            "Enter",
            Modifiers {
                shift: true,
                ..Modifiers::NONE
            },
        );
        assert_eq!(match_shortcut(&shift_enter, Overlay::InstructionBox), None);
        assert_eq!(
            match_shortcut(&KeyInput::plain("Escape"), Overlay::InstructionBox),
            Some(Command::CloseInstructionBox)
        );
        assert_eq!(match_shortcut(&KeyInput::alt("x"), Overlay::InstructionBox), None);
    }
}
