//! Prompting capability boundary.
//!
//! The configuration workflow asks its questions through the [`Prompter`]
//! trait instead of talking to a terminal library directly. Applications
//! plug in whatever frontend they use (a line editor, a TUI, a GUI
//! dialog); tests plug in a scripted fake and run headless.

/// One question for the user.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// Question text shown to the user.
    pub message: String,
    /// Optional longer help text shown alongside the question.
    pub long_instruction: Option<String>,
    /// Question kind with its seeded state.
    pub kind: PromptKind,
}

/// Question kind and the value it is seeded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    /// Free-text input, pre-filled with `default`.
    Text { default: String },
    /// Yes/no question.
    Confirm { default: bool },
    /// Pick exactly one of `choices`.
    Select {
        choices: Vec<String>,
        default: String,
    },
    /// Pick any subset of `choices`; `selected` marks the seeded picks.
    MultiSelect {
        choices: Vec<String>,
        selected: Vec<String>,
    },
}

/// A user's answer to a [`PromptRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Text(String),
    Confirm(bool),
    Choice(String),
    Choices(Vec<String>),
}

/// Blocking question-asking capability.
///
/// Implementations render the request however they like and return the
/// answer synchronously; the caller suspends until they do. Answers of a
/// kind that does not match the request are rejected by the caller.
pub trait Prompter {
    /// Ask one question and return the user's answer.
    fn ask(&mut self, request: PromptRequest) -> anyhow::Result<PromptAnswer>;
}

/// Headless prompter answering from a fixed script, for tests.
#[cfg(test)]
pub(crate) struct ScriptedPrompter {
    answers: std::collections::VecDeque<PromptAnswer>,
    /// Messages of the requests seen, in order.
    pub(crate) asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new(answers: impl IntoIterator<Item = PromptAnswer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, request: PromptRequest) -> anyhow::Result<PromptAnswer> {
        self.asked.push(request.message.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer left for `{}`", request.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_prompter_answers_in_order() {
        let mut prompter = ScriptedPrompter::new([
            PromptAnswer::Text("first".to_string()),
            PromptAnswer::Confirm(true),
        ]);
        let request = PromptRequest {
            message: "Value".to_string(),
            long_instruction: None,
            kind: PromptKind::Text {
                default: String::new(),
            },
        };

        assert_eq!(
            prompter.ask(request.clone()).unwrap(),
            PromptAnswer::Text("first".to_string())
        );
        assert_eq!(prompter.ask(request.clone()).unwrap(), PromptAnswer::Confirm(true));
        assert!(prompter.ask(request).is_err());
        assert_eq!(prompter.asked.len(), 3);
    }
}
