//! Skill extraction and career feedback via the text-generation fallback chain.

use serde::Serialize;

use crate::errors::AppError;
use crate::inference::{FallbackChain, InferenceClient};
use crate::resume::prompts::{
    clip_chars, FEEDBACK_PROMPT, MAX_RESUME_PROMPT_CHARS, SKILL_EXTRACTION_PROMPT,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillProfile {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillExtraction {
    /// Raw model output, kept for display.
    pub skill_vector: String,
    #[serde(flatten)]
    pub profile: SkillProfile,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub feedback: String,
    pub model: String,
}

/// Asks the model for technical and soft skill lists from a resume.
pub async fn extract_skills<C>(
    resume_text: &str,
    generator: &FallbackChain<C>,
) -> Result<SkillExtraction, AppError>
where
    C: InferenceClient<Output = String>,
{
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "consultant has no resume text; upload a resume first".to_string(),
        ));
    }

    let prompt = SKILL_EXTRACTION_PROMPT.replace(
        "{resume_text}",
        clip_chars(resume_text, MAX_RESUME_PROMPT_CHARS),
    );
    let completion = generator
        .run(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Skill extraction failed: {e}")))?;

    Ok(SkillExtraction {
        profile: parse_skill_lines(&completion.output),
        skill_vector: completion.output,
        model: completion.model,
    })
}

/// Short encouraging feedback for a skills summary.
pub async fn generate_feedback<C>(
    skills: &str,
    generator: &FallbackChain<C>,
) -> Result<Feedback, AppError>
where
    C: InferenceClient<Output = String>,
{
    let skills = skills.trim();
    if skills.is_empty() {
        return Err(AppError::Validation("skills cannot be empty".to_string()));
    }

    let prompt = FEEDBACK_PROMPT.replace("{skills}", skills);
    let completion = generator
        .run(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Feedback generation failed: {e}")))?;

    Ok(Feedback {
        feedback: completion.output.trim().to_string(),
        model: completion.model,
    })
}

/// Parses `technical_skills: a, b` / `soft_skills: c, d` lines.
/// Tolerates markdown emphasis, list numbering, spaces in labels, and missing lines.
pub fn parse_skill_lines(text: &str) -> SkillProfile {
    let mut profile = SkillProfile::default();

    for line in text.lines() {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        let label = label
            .trim()
            .trim_matches('*')
            .trim()
            .to_lowercase()
            .replace(' ', "_");

        let target = if label.ends_with("technical_skills") {
            &mut profile.technical_skills
        } else if label.ends_with("soft_skills") {
            &mut profile.soft_skills
        } else {
            continue;
        };

        for skill in rest.split(',') {
            let skill = skill.trim().trim_matches('*').trim().trim_end_matches('.');
            if !skill.is_empty()
                && !target.iter().any(|s: &String| s.eq_ignore_ascii_case(skill))
            {
                target.push(skill.to_string());
            }
        }
    }

    profile
}
