//! services/app/src/app/suggestions.rs
//!
//! The suggestion overlay over a structured document: fetch the suggestions
//! for a document, project each onto its first textual occurrence, and apply
//! them one at a time. Applying replaces the span, removes that highlight
//! and remaps the remaining ones through the edit.

use std::sync::Arc;

use learnx_core::document::{project, replace_span, DocNode, LocatedSuggestion};
use learnx_core::ports::SuggestionService;
use tracing::warn;
use uuid::Uuid;

/// The overlay view-model. Highlights are held in fetch order.
pub struct SuggestionOverlay {
    api: Arc<dyn SuggestionService>,
    pub highlights: Vec<LocatedSuggestion>,
}

impl SuggestionOverlay {
    pub fn new(api: Arc<dyn SuggestionService>) -> Self {
        Self {
            api,
            highlights: Vec::new(),
        }
    }

    /// Fetches and projects the suggestions for a document. A failed fetch
    /// degrades to no overlay at all.
    pub async fn load(&mut self, doc: &DocNode, document_id: Uuid) {
        match self.api.fetch_suggestions(document_id).await {
            Ok(suggestions) => self.highlights = project(doc, suggestions),
            Err(e) => {
                warn!(%document_id, "failed to load suggestions: {}", e);
                self.highlights.clear();
            }
        }
    }

    /// Applies one suggestion. Returns `false` when it is unknown, was
    /// never located, or its span no longer fits the document.
    pub fn apply(&mut self, doc: &mut DocNode, suggestion_id: Uuid) -> bool {
        let Some(ix) = self
            .highlights
            .iter()
            .position(|h| h.suggestion.id == suggestion_id)
        else {
            return false;
        };
        let Some(span) = self.highlights[ix].span else {
            return false;
        };
        let replacement = self.highlights[ix].suggestion.suggested_text.clone();
        if !replace_span(doc, span, &replacement) {
            return false;
        }
        self.highlights.remove(ix);
        for highlight in &mut self.highlights {
            if let Some(s) = highlight.span {
                highlight.span = s.map_through(span, replacement.len());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnx_core::domain::Suggestion;
    use learnx_core::ports::PortResult;

    struct FakeSuggestions {
        suggestions: Vec<Suggestion>,
    }

    #[async_trait]
    impl SuggestionService for FakeSuggestions {
        async fn fetch_suggestions(&self, _document_id: Uuid) -> PortResult<Vec<Suggestion>> {
            Ok(self.suggestions.clone())
        }
    }

    fn doc() -> DocNode {
        DocNode::Block(vec![DocNode::Block(vec![DocNode::Text(
            "the quick brown fox jumps".into(),
        )])])
    }

    fn suggestion(original: &str, suggested: &str) -> Suggestion {
        Suggestion {
            id: Uuid::new_v4(),
            original_text: original.into(),
            suggested_text: suggested.into(),
        }
    }

    #[tokio::test]
    async fn applying_replaces_text_and_remaps_the_remaining_highlight() {
        let first = suggestion("quick", "sluggish");
        let second = suggestion("jumps", "trips");
        let first_id = first.id;
        let second_id = second.id;
        let api = Arc::new(FakeSuggestions {
            suggestions: vec![first, second],
        });

        let mut doc = doc();
        let mut overlay = SuggestionOverlay::new(api);
        overlay.load(&doc, Uuid::new_v4()).await;
        assert_eq!(overlay.highlights.len(), 2);

        assert!(overlay.apply(&mut doc, first_id));
        assert!(doc.plain_text().contains("the sluggish brown fox jumps"));
        assert_eq!(overlay.highlights.len(), 1);

        // The second highlight shifted with the edit and still applies.
        assert!(overlay.apply(&mut doc, second_id));
        assert!(doc.plain_text().contains("the sluggish brown fox trips"));
        assert!(overlay.highlights.is_empty());
    }

    #[tokio::test]
    async fn an_unlocated_suggestion_cannot_be_applied()  {
        let missing = suggestion("unicorn", "horse");
        let missing_id = missing.id;
        let api = Arc::new(FakeSuggestions {
            suggestions: vec![missing],
        });

        let mut doc = doc();
        let mut overlay = SuggestionOverlay::new(api);
        overlay.load(&doc, Uuid::new_v4()).await;

        assert!(overlay.highlights[0].span.is_none());
        assert!(!overlay.apply(&mut doc, missing_id));
        assert_eq!(doc, self::doc());
    }
}
