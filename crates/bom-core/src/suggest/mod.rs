//! AI-assisted component suggestions.
//!
//! ```text
//! EditorSession --begin_suggestion()--> SuggestionTicket
//!     |                                        |
//!     |                     Suggester::suggest(request)
//!     |                                        |
//!     |            prompt::build_prompt + prompt::response_schema
//!     |                                        |
//!     |                  GeminiSuggester --POST--> generateContent
//!     |                                        |
//!     |              response::parse_suggestions (all-or-nothing)
//!     |                                        |
//!     +<--apply_suggestions(ticket, items)-----+
//! ```

pub mod gemini;
pub mod prompt;
pub mod response;
pub mod trait_def;

pub use gemini::GeminiSuggester;
pub use prompt::{DEFAULT_CONTEXT, SYSTEM_INSTRUCTION, build_prompt, response_schema};
pub use response::{SuggestedItem, parse_suggestions};
pub use trait_def::{SuggestError, Suggester, SuggestionRequest};

/// What a user is told when a fetch fails. Details go to the log.
pub const FAILURE_MESSAGE: &str =
    "Failed to generate suggestions. Please check API configuration.";
