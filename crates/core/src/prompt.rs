//! Prompt and caption sanitation.
//!
//! The raw user prompt is validated here before any quota is consumed.
//! The caption ("overlay text") is stripped of the quoting characters
//! users paste around it, and the synthesis prompt gets a fixed style
//! suffix so stills come back in a consistent cinematic register.

use crate::error::CoreError;

/// Style suffix appended to every synthesis prompt.
pub const STYLE_SUFFIX: &str = ", beautiful, high quality, cinematic";

/// Upper bound on the raw prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 1_000;

/// Upper bound on the caption length, in characters.
pub const MAX_OVERLAY_CHARS: usize = 255;

/// Validate the raw prompt: non-empty after trimming, within length bounds.
pub fn validate_prompt(raw: &str) -> Result<(), CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "Prompt must be at most {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(())
}

/// Sanitize the caption: trim whitespace and surrounding quote characters.
///
/// Returns `None` when nothing printable remains, so callers can treat
/// "no caption" and "caption of quotes" identically.
pub fn sanitize_overlay(overlay: Option<&str>) -> Option<String> {
    let cleaned = overlay?
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.chars().take(MAX_OVERLAY_CHARS).collect())
    }
}

/// Build the final synthesis prompt from the (possibly enhanced) prompt.
///
/// The suffix is not applied twice if a previous run's output is pasted
/// back in.
pub fn build_final_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.ends_with(STYLE_SUFFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{STYLE_SUFFIX}")
    }
}
