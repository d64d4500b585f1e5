use serde::{Deserialize, Serialize};

use super::extract::{extract_fragments, extract_spanned};

/// Reserved directive tags. Any other tag name is resolved against the
/// registered tool set.
pub const THINKING_TAG: &str = "thinking";
pub const FOLLOWUP_QUESTION_TAG: &str = "ask_followup_question";
pub const COMPLETION_TAG: &str = "attempt_completion";

const QUESTION_TAG: &str = "question";
const FOLLOW_UP_TAG: &str = "follow_up";
const SUGGEST_TAG: &str = "suggest";
const RESULT_TAG: &str = "result";
const COMMAND_TAG: &str = "command";

/// A thought is surfaced verbatim, trimmed; it carries no further structure.
pub fn decode_thought(content: &str) -> String {
    content.trim().to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowupQuestion {
    pub question: String,
    /// Suggested answers in source order, blanks dropped.
    pub options: Vec<String>,
}

/// Missing or whitespace-only wrapper tags yield empty fields, never errors.
pub fn decode_followup_question(content: &str) -> FollowupQuestion {
    let children = extract_fragments(content);

    let question = children
        .iter()
        .find(|child| child.tag_name == QUESTION_TAG)
        .map(|child| child.content.trim().to_string())
        .unwrap_or_default();

    let options = children
        .iter()
        .find(|child| child.tag_name == FOLLOW_UP_TAG)
        .map(|follow_up| {
            extract_fragments(&follow_up.content)
                .into_iter()
                .filter(|child| child.tag_name == SUGGEST_TAG)
                .map(|child| child.content.trim().to_string())
                .filter(|option| !option.is_empty())
                .collect()
        })
        .unwrap_or_default();

    FollowupQuestion { question, options }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionDirective {
    pub result: String,
    pub command: Option<String>,
}

impl CompletionDirective {
    /// The single human-readable string handed to observers.
    pub fn display_text(&self) -> String {
        match &self.command {
            Some(command) => format!("{}\n\nCommand: {}", self.result, command),
            None => self.result.clone(),
        }
    }
}

/// The `<command>` child is located first and its matched text removed, so the
/// command never leaks into the result. A remainder wholly wrapped by one
/// `<result>` pair is unwrapped; anything else is used trimmed, as-is.
pub fn decode_completion(content: &str) -> CompletionDirective {
    let mut remainder = content.to_string();
    let mut command = None;

    if let Some(spanned) = extract_spanned(content)
        .into_iter()
        .find(|spanned| spanned.fragment.tag_name == COMMAND_TAG)
    {
        let trimmed = spanned.fragment.content.trim();
        if !trimmed.is_empty() {
            command = Some(trimmed.to_string());
        }
        remainder.replace_range(spanned.span, "");
    }

    let trimmed = remainder.trim();
    let spanned = extract_spanned(trimmed);
    let result = match spanned.as_slice() {
        [only]
            if only.fragment.tag_name == RESULT_TAG
                && only.span.start == 0
                && only.span.end == trimmed.len() =>
        {
            only.fragment.content.trim().to_string()
        }
        _ => trimmed.to_string(),
    };

    CompletionDirective { result, command }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thought_content_is_trimmed_verbatim() {
        assert_eq!(decode_thought("  weighing options \n"), "weighing options");
    }

    #[test]
    fn followup_question_drops_blank_suggestions() {
        let decoded = decode_followup_question(
            "<question>What path?</question><follow_up><suggest>./a.json</suggest><suggest>   </suggest></follow_up>",
        );
        assert_eq!(decoded.question, "What path?");
        assert_eq!(decoded.options, vec!["./a.json"]);
    }

    #[test]
    fn followup_question_preserves_option_order() {
        let decoded = decode_followup_question(
            "<question>Pick one</question><follow_up><suggest>b</suggest><suggest>a</suggest></follow_up>",
        );
        assert_eq!(decoded.options, vec!["b", "a"]);
    }

    #[test]
    fn missing_wrappers_yield_empty_fields() {
        let decoded = decode_followup_question("no structure at all");
        assert_eq!(decoded.question, "");
        assert!(decoded.options.is_empty());
    }

    #[test]
    fn completion_separates_result_and_command() {
        let decoded = decode_completion("<result>Done</result><command>ls</command>");
        assert_eq!(decoded.result, "Done");
        assert_eq!(decoded.command.as_deref(), Some("ls"));
        assert!(!decoded.result.contains("ls"));
    }

    #[test]
    fn completion_without_result_wrapper_uses_the_trimmed_remainder() {
        let decoded = decode_completion("  All finished.  <command>make test</command>");
        assert_eq!(decoded.result, "All finished.");
        assert_eq!(decoded.command.as_deref(), Some("make test"));
    }

    #[test]
    fn partially_wrapped_remainder_is_not_unwrapped() {
        let decoded = decode_completion("<result>part</result> and more");
        assert_eq!(decoded.result, "<result>part</result> and more");
        assert_eq!(decoded.command, None);
    }

    #[test]
    fn blank_command_counts_as_absent() {
        let decoded = decode_completion("<result>Done</result><command>  </command>");
        assert_eq!(decoded.result, "Done");
        assert_eq!(decoded.command, None);
    }

    #[test]
    fn display_text_joins_result_and_command() {
        let directive = CompletionDirective {
            result: "Done".to_string(),
            command: Some("ls".to_string()),
        };
        assert_eq!(directive.display_text(), "Done\n\nCommand: ls");
        let plain = CompletionDirective {
            result: "Done".to_string(),
            command: None,
        };
        assert_eq!(plain.display_text(), "Done");
    }
}
