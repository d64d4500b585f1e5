//! The tag-delimited text protocol spoken by the model.
//!
//! Scanning is deliberately forgiving: malformed input never errors, it just
//! yields fewer fragments. Matching is by literal back-reference to the
//! opening tag name, not by structural nesting, so a tag nested inside a tag
//! of the same name closes at the first candidate closing marker.

mod directives;
mod extract;
mod params;

pub use directives::{
    COMPLETION_TAG, CompletionDirective, FOLLOWUP_QUESTION_TAG, FollowupQuestion, THINKING_TAG,
    decode_completion, decode_followup_question, decode_thought,
};
pub use extract::{Fragment, extract_fragments};
pub use params::decode_parameters;
