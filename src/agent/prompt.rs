//! Instruction payload loading.

use std::path::Path;

/// Used in place of the prompt file when it cannot be read.
pub const FALLBACK_PROMPT: &str = "Analyze the logs and fix any issues with the Playwright script.";

/// Read the prompt file. A read failure yields [`FALLBACK_PROMPT`] with the
/// error appended so the agent still gets a usable instruction.
pub fn load_prompt(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(prompt) => prompt,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load prompt file, using fallback");
            format!("{} Error loading prompt: {}", FALLBACK_PROMPT, e)
        }
    }
}
