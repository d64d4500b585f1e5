use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// One tag-name/content pair lifted out of model output. Ephemeral: consumed
/// within a single engine iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub tag_name: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SpannedFragment {
    pub(crate) fragment: Fragment,
    pub(crate) span: Range<usize>,
}

fn open_tag_regex() -> &'static Regex {
    static OPEN_TAG: OnceLock<Regex> = OnceLock::new();
    OPEN_TAG.get_or_init(|| {
        Regex::new(r"<([A-Za-z0-9_.-]+)(?:\s[^>]*)?>").expect("open tag pattern")
    })
}

/// Scan `input` for tag fragments in first-match, left-to-right,
/// non-overlapping order.
///
/// Content runs from the end of the opening marker to the first literal
/// `</name>`; attributes in the opening marker are ignored. An opening tag
/// with no closing counterpart yields nothing and scanning resumes after it.
pub fn extract_fragments(input: &str) -> Vec<Fragment> {
    extract_spanned(input)
        .into_iter()
        .map(|spanned| spanned.fragment)
        .collect()
}

pub(crate) fn extract_spanned(input: &str) -> Vec<SpannedFragment> {
    let regex = open_tag_regex();
    let mut fragments = Vec::new();
    let mut cursor = 0usize;

    while cursor <= input.len() {
        let Some(captures) = regex.captures_at(input, cursor) else {
            break;
        };
        let opening = captures.get(0).expect("whole match");
        let tag_name = captures.get(1).expect("tag name group").as_str();
        let content_start = opening.end();
        let closing_marker = format!("</{tag_name}>");

        match input[content_start..].find(&closing_marker) {
            Some(offset) => {
                let content_end = content_start + offset;
                let span_end = content_end + closing_marker.len();
                fragments.push(SpannedFragment {
                    fragment: Fragment {
                        tag_name: tag_name.to_string(),
                        content: input[content_start..content_end].to_string(),
                    },
                    span: opening.start()..span_end,
                });
                cursor = span_end;
            }
            // No closing marker: not a fragment, keep scanning past the opener.
            None => cursor = content_start,
        }
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(input: &str) -> Vec<String> {
        extract_fragments(input)
            .into_iter()
            .map(|fragment| fragment.tag_name)
            .collect()
    }

    #[test]
    fn plain_text_yields_no_fragments() {
        assert!(extract_fragments("no tags here").is_empty());
        assert!(extract_fragments("").is_empty());
    }

    #[test]
    fn partial_angle_brackets_yield_no_fragments() {
        assert!(extract_fragments("a < b and c > d").is_empty());
        assert!(extract_fragments("<open-only>").is_empty());
    }

    #[test]
    fn sibling_fragments_come_back_in_document_order() {
        let fragments = extract_fragments("<a>x</a><b>y</b>");
        assert_eq!(
            fragments,
            vec![
                Fragment {
                    tag_name: "a".to_string(),
                    content: "x".to_string()
                },
                Fragment {
                    tag_name: "b".to_string(),
                    content: "y".to_string()
                },
            ]
        );
    }

    #[test]
    fn differently_named_nesting_is_kept_inside_the_outer_fragment() {
        let fragments = extract_fragments("<outer><inner>z</inner></outer>");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].tag_name, "outer");
        assert_eq!(fragments[0].content, "<inner>z</inner>");
    }

    #[test]
    fn same_name_nesting_closes_at_the_first_candidate() {
        let fragments = extract_fragments("<a><a>x</a></a>");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].content, "<a>x");
    }

    #[test]
    fn unclosed_opener_is_skipped_but_later_fragments_survive() {
        assert_eq!(names("<a><b>y</b>"), vec!["b"]);
        assert_eq!(names("<a>text without close"), Vec::<String>::new());
    }

    #[test]
    fn attributes_in_the_opening_marker_are_ignored() {
        let fragments = extract_fragments(r#"<file path="/tmp/x" mode="r">body</file>"#);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].tag_name, "file");
        assert_eq!(fragments[0].content, "body");
    }

    #[test]
    fn spans_cover_opening_through_closing_marker() {
        let input = "pad <a>x</a> tail";
        let spanned = extract_spanned(input);
        assert_eq!(spanned.len(), 1);
        assert_eq!(&input[spanned[0].span.clone()], "<a>x</a>");
    }

    #[test]
    fn rescanning_extracted_content_is_a_no_op() {
        let fragments = extract_fragments("<p>plain value</p>");
        assert_eq!(fragments.len(), 1);
        assert!(extract_fragments(&fragments[0].content).is_empty());
    }
}
