use serde::{Deserialize, Serialize};

/// A reply the player can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueOption {
    pub text: String,
    pub tone: String,
    /// Key of the consequence table entry this reply leads to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequence: Option<String>,
}

impl DialogueOption {
    pub fn new(text: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: tone.into(),
            consequence: None,
        }
    }

    pub fn leading_to(mut self, consequence: impl Into<String>) -> Self {
        self.consequence = Some(consequence.into());
        self
    }
}

/// A spoken line plus the replies offered after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub main_dialogue: String,
    pub options: Vec<DialogueOption>,
}

impl Dialogue {
    pub fn new(main_dialogue: impl Into<String>, options: Vec<DialogueOption>) -> Self {
        Self {
            main_dialogue: main_dialogue.into(),
            options,
        }
    }
}
