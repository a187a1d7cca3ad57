//! Two-tier text extraction from backend responses.
//!
//! Policy: prefer the direct `content` field. When it is empty and a
//! reasoning trace is present, take the last substantive line of the trace;
//! when no line qualifies, fall back to the trailing 200 characters.

use crate::llms::backend::ChatCompletion;

const FALLBACK_TAIL_CHARS: usize = 200;
const MIN_ANSWER_CHARS: usize = 10;

/// Lines opening with these connective phrases are reasoning narration, not
/// the answer itself.
const SKIPPED_PREFIXES: [&str; 2] = ["我需要", "作为一个"];

/// Extract the generated text from a completion.
pub fn extract_content(completion: &ChatCompletion) -> String {
    if !completion.content.is_empty() {
        return completion.content.clone();
    }
    completion
        .reasoning_content
        .as_deref()
        .map(final_answer_from_reasoning)
        .unwrap_or_default()
}

/// Pick the final answer out of a reasoning trace: the last line that is
/// non-empty, longer than ten characters, and not a narration line. Falls
/// back to the trailing 200 characters when nothing qualifies.
pub fn final_answer_from_reasoning(reasoning: &str) -> String {
    for line in reasoning.lines().rev() {
        let line = line.trim();
        if line.is_empty() || line.chars().count() <= MIN_ANSWER_CHARS {
            continue;
        }
        if SKIPPED_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            continue;
        }
        return line.to_string();
    }

    let chars: Vec<char> = reasoning.chars().collect();
    if chars.len() > FALLBACK_TAIL_CHARS {
        chars[chars.len() - FALLBACK_TAIL_CHARS..].iter().collect()
    } else {
        reasoning.to_string()
    }
}
