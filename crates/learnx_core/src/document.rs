//! crates/learnx_core/src/document.rs
//!
//! A minimal structured-document model for the suggestion overlay: a tree of
//! block nodes with text leaves, addressed by the editor's position scheme
//! (entering or leaving a non-root block costs one position, text counts one
//! per byte, the root's content starts at zero).

use crate::domain::Suggestion;

/// One node of a structured document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocNode {
    Block(Vec<DocNode>),
    Text(String),
}

impl DocNode {
    /// The number of positions this node occupies.
    pub fn size(&self) -> usize {
        match self {
            DocNode::Text(t) => t.len(),
            DocNode::Block(children) => 2 + children.iter().map(DocNode::size).sum::<usize>(),
        }
    }

    /// The concatenated text content, for display.
    pub fn plain_text(&self) -> String {
        match self {
            DocNode::Text(t) => t.clone(),
            DocNode::Block(children) => children
                .iter()
                .map(DocNode::plain_text)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A half-open position range within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Maps this span through a replacement of `replaced` by text of
    /// `new_len` positions. Spans before the replacement are unchanged,
    /// spans after it shift by the length delta, and spans overlapping it
    /// are dropped.
    pub fn map_through(self, replaced: Span, new_len: usize) -> Option<Span> {
        let old_len = replaced.end - replaced.start;
        if self.end <= replaced.start {
            Some(self)
        } else if self.start >= replaced.end {
            // Positions past the replacement shift by the length delta.
            let shift = |p: usize| p - old_len + new_len;
            Some(Span {
                start: shift(self.start),
                end: shift(self.end),
            })
        } else {
            None
        }
    }
}

/// A suggestion projected onto the document. `span` is `None` when the
/// original text could not be located.
#[derive(Debug, Clone)]
pub struct LocatedSuggestion {
    pub suggestion: Suggestion,
    pub span: Option<Span>,
}

/// Locates the first occurrence of `needle` in document order.
///
/// A match must lie within a single text node; text straddling two nodes is
/// never matched. Repeated or overlapping occurrences are not disambiguated:
/// the first one wins. This mirrors the editor's first-match scan and is a
/// known precision limit, not a defect.
pub fn find_first(doc: &DocNode, needle: &str) -> Option<Span> {
    if needle.is_empty() {
        return None;
    }
    match doc {
        // The root block's content starts at position zero.
        DocNode::Block(children) => scan_children(children, 0, needle).err(),
        DocNode::Text(t) => t.find(needle).map(|ix| Span {
            start: ix,
            end: ix + needle.len(),
        }),
    }
}

// Returns Err(span) on the first match, Ok(next position) otherwise.
fn scan_children(children: &[DocNode], mut pos: usize, needle: &str) -> Result<usize, Span> {
    for child in children {
        match child {
            DocNode::Text(t) => {
                if let Some(ix) = t.find(needle) {
                    return Err(Span {
                        start: pos + ix,
                        end: pos + ix + needle.len(),
                    });
                }
                pos += t.len();
            }
            DocNode::Block(inner) => {
                pos = scan_children(inner, pos + 1, needle)? + 1;
            }
        }
    }
    Ok(pos)
}

/// Replaces `span` with `replacement`. The span must be fully contained in
/// one text node (which is what [`find_first`] produces); returns `false`
/// and leaves the document untouched otherwise.
pub fn replace_span(doc: &mut DocNode, span: Span, replacement: &str) -> bool {
    if span.end < span.start {
        return false;
    }
    match doc {
        DocNode::Block(children) => replace_in_children(children, 0, span, replacement).is_err(),
        DocNode::Text(t) => {
            if span.end <= t.len() {
                t.replace_range(span.start..span.end, replacement);
                true
            } else {
                false
            }
        }
    }
}

// Returns Err(()) once the replacement happened, Ok(next position) otherwise.
fn replace_in_children(
    children: &mut [DocNode],
    mut pos: usize,
    span: Span,
    replacement: &str,
) -> Result<usize, ()> {
    for child in children {
        match child {
            DocNode::Text(t) => {
                let end = pos + t.len();
                if span.start >= pos && span.end <= end {
                    t.replace_range(span.start - pos..span.end - pos, replacement);
                    return Err(());
                }
                pos = end;
            }
            DocNode::Block(inner) => {
                pos = replace_in_children(inner, pos + 1, span, replacement)? + 1;
            }
        }
    }
    Ok(pos)
}

/// Projects fetched suggestions onto the document, locating each
/// `original_text` by a first-match scan.
pub fn project(doc: &DocNode, suggestions: Vec<Suggestion>) -> Vec<LocatedSuggestion> {
    suggestions
        .into_iter()
        .map(|suggestion| {
            let span = find_first(doc, &suggestion.original_text);
            LocatedSuggestion { suggestion, span }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn doc() -> DocNode {
        DocNode::Block(vec![
            DocNode::Block(vec![DocNode::Text("the quick brown fox".into())]),
            DocNode::Block(vec![DocNode::Text("jumps over the lazy dog".into())]),
        ])
    }

    fn suggestion(original: &str, suggested: &str) -> Suggestion {
        Suggestion {
            id: Uuid::new_v4(),
            original_text: original.into(),
            suggested_text: suggested.into(),
        }
    }

    #[test]
    fn finds_first_occurrence_only() {
        // "the" appears in both paragraphs; the first one wins.
        let span = find_first(&doc(), "the").unwrap();
        assert_eq!(span, Span { start: 1, end: 4 });
    }

    #[test]
    fn second_paragraph_positions_account_for_block_boundaries() {
        // First paragraph: open at 0, text 1..20, close at 20.
        // Second paragraph opens at 21, its text starts at 22.
        let span = find_first(&doc(), "jumps").unwrap();
        assert_eq!(span, Span { start: 22, end: 27 });
    }

    #[test]
    fn does_not_match_across_text_nodes() {
        let d = DocNode::Block(vec![DocNode::Block(vec![
            DocNode::Text("hello ".into()),
            DocNode::Text("world".into()),
        ])]);
        assert!(find_first(&d, "hello world").is_none());
        assert!(find_first(&d, "world").is_some());
    }

    #[test]
    fn empty_needle_never_matches() {
        assert!(find_first(&doc(), "").is_none());
    }

    #[test]
    fn replace_swaps_the_span_in_place() {
        let mut d = doc();
        let span = find_first(&d, "quick").unwrap();
        assert!(replace_span(&mut d, span, "sluggish"));
        assert!(d.plain_text().contains("the sluggish brown fox"));
        // The rest of the document is untouched.
        assert!(d.plain_text().contains("jumps over the lazy dog"));
    }

    #[test]
    fn replace_rejects_span_outside_any_text_node() {
        let mut d = doc();
        let before = d.clone();
        assert!(!replace_span(&mut d, Span { start: 0, end: 25 }, "x"));
        assert_eq!(d, before);
    }

    #[test]
    fn map_through_shifts_later_spans_and_drops_overlaps() {
        let replaced = Span { start: 5, end: 10 };
        let earlier = Span { start: 0, end: 4 };
        let later = Span { start: 12, end: 15 };
        let overlapping = Span { start: 8, end: 12 };

        // Replacement text is two positions longer.
        assert_eq!(earlier.map_through(replaced, 7), Some(earlier));
        assert_eq!(
            later.map_through(replaced, 7),
            Some(Span { start: 14, end: 17 })
        );
        assert_eq!(overlapping.map_through(replaced, 7), None);
    }

    #[test]
    fn project_locates_each_suggestion_or_yields_none() {
        let located = project(
            &doc(),
            vec![suggestion("lazy", "sleepy"), suggestion("unicorn", "horse")],
        );
        assert_eq!(located.len(), 2);
        assert!(located[0].span.is_some());
        assert!(located[1].span.is_none());
    }
}
