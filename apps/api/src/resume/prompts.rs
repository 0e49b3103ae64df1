// Prompts for resume skill extraction and career feedback.

/// Only the head of a resume is sent to the model.
pub const MAX_RESUME_PROMPT_CHARS: usize = 3000;

pub const SKILL_EXTRACTION_PROMPT: &str = "\
From the following resume, extract two clean, comma-separated lists:
1) technical_skills: only skill names relevant to technical work (no ratings).
2) soft_skills: only skill names relevant to soft skills (no ratings).
Return strictly in this format:
technical_skills: skill1, skill2, ...
soft_skills: skill1, skill2, ...
Resume:
{resume_text}";

pub const FEEDBACK_PROMPT: &str = "\
You are an AI career advisor. Based on these consultant skills:
{skills}

Provide a 3-4 line personalized, encouraging feedback on what the consultant is good at \
and what they could focus on to improve.";

/// First `max` characters of `text`, cut on a char boundary.
pub fn clip_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
