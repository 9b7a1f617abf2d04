//! Prompt and output-schema construction for suggestion requests.
//!
//! Pure functions only; the HTTP exchange lives in [`super::gemini`].

use serde_json::{Value, json};

use super::trait_def::SuggestionRequest;

/// Context used when the caller supplies none.
pub const DEFAULT_CONTEXT: &str = "Standard electronics module";

/// Role given to the model for every request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert electronics engineer assisting with BOM creation.";

/// Build the user prompt for a suggestion request.
pub fn build_prompt(request: &SuggestionRequest) -> String {
    let context = request
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CONTEXT);

    let mut prompt = String::with_capacity(256);
    prompt.push_str(&format!(
        "Generate a realistic Bill of Materials (BOM) for an electronics module named: \"{}\".\n",
        request.module_name
    ));
    prompt.push_str(&format!("Context/Description: {context}.\n"));
    prompt.push_str(
        "Provide a list of 5-10 common components that would be found in such a device.\n",
    );
    prompt
}

/// The structured-output schema the model must follow.
///
/// An array of objects; all four properties are required.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "component": {
                    "type": "STRING",
                    "description": "The name of the electronic component (e.g., Resistor, Capacitor, IC)."
                },
                "value": {
                    "type": "STRING",
                    "description": "The technical value or specification (e.g., 10k, 10uF, ATmega328)."
                },
                "totalQuantity": {
                    "type": "INTEGER",
                    "description": "Total quantity needed for the build."
                },
                "pcbQuantity": {
                    "type": "INTEGER",
                    "description": "Quantity per PCB."
                }
            },
            "required": ["component", "value", "totalQuantity", "pcbQuantity"]
        }
    })
}
