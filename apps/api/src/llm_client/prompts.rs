// Shared prompt fragments. Each service that calls the model keeps its own
// prompts.rs alongside it; only cross-cutting instructions live here.

/// Closing instruction for prompts whose completion is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Return only the JSON object, no additional text or explanations.";
