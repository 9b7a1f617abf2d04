//! The `Suggester` trait -- the adapter interface for suggestion backends.
//!
//! The trait is object-safe so the UI can hold an `Arc<dyn Suggester>` and
//! tests can substitute a scripted implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Item;

/// Input for one suggestion fetch.
///
/// `module_name` must be non-blank; callers check this before issuing the
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub module_name: String,
    pub context: Option<String>,
}

/// Why a suggestion fetch produced nothing.
///
/// Every variant means the whole fetch failed; no partial results exist.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("no API key configured for the suggestion service")]
    MissingCredential,

    #[error("request to suggestion service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("suggestion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response envelope from suggestion service: {0}")]
    Envelope(String),

    #[error("suggestions did not match the expected schema: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Backend that turns a module name and context into candidate items.
#[async_trait]
pub trait Suggester: Send + Sync {
    /// Short name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Fetch suggestions.
    ///
    /// On success returns items numbered `1..=K` with fresh ids and
    /// `selected = false`; the caller renumbers them when merging.
    async fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<Item>, SuggestError>;
}

// Compile-time assertion: Suggester must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Suggester) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewItem;

    struct StaticSuggester;

    #[async_trait]
    impl Suggester for StaticSuggester {
        fn name(&self) -> &str {
            "static"
        }

        async fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<Item>, SuggestError> {
            Ok(vec![
                NewItem {
                    component: format!("{} MCU", request.module_name),
                    value: "STM32".to_string(),
                    total_quantity: 1,
                    pcb_quantity: 1,
                }
                .into_item(1),
            ])
        }
    }

    #[tokio::test]
    async fn suggester_is_usable_as_trait_object() {
        let suggester: Box<dyn Suggester> = Box::new(StaticSuggester);
        assert_eq!(suggester.name(), "static");

        let items = suggester
            .suggest(&SuggestionRequest {
                module_name: "Printer".to_string(),
                context: None,
            })
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].component, "Printer MCU");
    }

    #[test]
    fn errors_render_readably() {
        assert_eq!(
            SuggestError::MissingCredential.to_string(),
            "no API key configured for the suggestion service"
        );
        let status = SuggestError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(status.to_string().contains("HTTP 503"));
    }
}
