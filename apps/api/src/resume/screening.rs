//! Keyword screening: which required keywords appear in a resume, as whole words.
//!
//! Pure and local; no model call. Matching is case-insensitive on word boundaries,
//! so "java" does not match "javascript".

use regex::Regex;
use serde::Serialize;

pub const NO_KEYWORDS_MESSAGE: &str = "No keywords provided for checking.";
pub const NO_RESUME_MESSAGE: &str = "Could not read or process the resume file.";

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub match_score_percent: f64,
    pub found_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub feedback: String,
}

/// Screens `resume_text` against `keywords`.
///
/// Keywords are trimmed and deduplicated case-insensitively (first spelling wins)
/// before scoring. Score = found / distinct keywords * 100, rounded to 2 decimals.
pub fn screen_resume(resume_text: &str, keywords: &[String]) -> ScreeningReport {
    let keywords = dedup_keywords(keywords);

    if keywords.is_empty() {
        return empty_report(NO_KEYWORDS_MESSAGE);
    }
    if resume_text.trim().is_empty() {
        return empty_report(NO_RESUME_MESSAGE);
    }

    let text = resume_text.to_lowercase();
    let (found, missing): (Vec<String>, Vec<String>) = keywords
        .into_iter()
        .partition(|keyword| contains_word(&text, keyword));

    let total = found.len() + missing.len();
    let match_score_percent = round2(found.len() as f64 / total as f64 * 100.0);
    let feedback = local_feedback(&found);

    ScreeningReport {
        match_score_percent,
        found_keywords: found,
        missing_keywords: missing,
        message: None,
        feedback,
    }
}

/// Canned feedback naming the matched skills.
pub fn local_feedback(found_keywords: &[String]) -> String {
    if found_keywords.is_empty() {
        return "The resume did not match any of the required keywords.".to_string();
    }

    format!(
        "This is a promising resume, showing a good match for skills like: {}. \
         These are valuable assets for the role. To further improve, ensure these skills \
         are highlighted prominently with examples in the project experience section.",
        found_keywords.join(", ")
    )
}

fn empty_report(message: &str) -> ScreeningReport {
    ScreeningReport {
        match_score_percent: 0.0,
        found_keywords: vec![],
        missing_keywords: vec![],
        message: Some(message.to_string()),
        feedback: local_feedback(&[]),
    }
}

fn dedup_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .map(String::from)
        .collect()
}

/// `text` must already be lower-cased.
fn contains_word(text: &str, keyword: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(&keyword.to_lowercase()));
    Regex::new(&pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Senior engineer. Built services in Python and Go on AWS. \
                          Led a team of 5. JavaScript frontends with React.";

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_keywords_found() {
        let report = screen_resume(RESUME, &kws(&["python", "AWS", "react"]));
        assert_eq!(report.match_score_percent, 100.0);
        assert_eq!(report.found_keywords, kws(&["python", "AWS", "react"]));
        assert!(report.missing_keywords.is_empty());
        assert!(report.message.is_none());
    }

    #[test]
    fn test_word_boundaries_are_respected() {
        let report = screen_resume(RESUME, &kws(&["java", "go"]));
        assert_eq!(report.found_keywords, kws(&["go"]));
        assert_eq!(report.missing_keywords, kws(&["java"]));
        assert_eq!(report.match_score_percent, 50.0);
    }

    #[test]
    fn test_score_rounds_to_two_decimals() {
        let report = screen_resume(RESUME, &kws(&["python", "rust", "kotlin"]));
        assert_eq!(report.match_score_percent, 33.33);
    }

    #[test]
    fn test_multi_word_keyword() {
        let report = screen_resume(RESUME, &kws(&["team of 5", "team of 6"]));
        assert_eq!(report.found_keywords, kws(&["team of 5"]));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let report = screen_resume("experience with node.js", &kws(&["node.js", "nodeXjs"]));
        assert_eq!(report.found_keywords, kws(&["node.js"]));
    }

    #[test]
    fn test_duplicate_keywords_counted_once() {
        let report = screen_resume(RESUME, &kws(&["Python", "python ", "rust"]));
        assert_eq!(report.found_keywords, kws(&["Python"]));
        assert_eq!(report.match_score_percent, 50.0);
    }

    #[test]
    fn test_no_keywords() {
        let report = screen_resume(RESUME, &kws(&["", "  "]));
        assert_eq!(report.match_score_percent, 0.0);
        assert_eq!(report.message.as_deref(), Some(NO_KEYWORDS_MESSAGE));
    }

    #[test]
    fn test_empty_resume() {
        let report = screen_resume("  ", &kws(&["python"]));
        assert_eq!(report.match_score_percent, 0.0);
        assert_eq!(
            report.message.as_deref(),
            Some("Could not read or process the resume file.")
        );
    }

    #[test]
    fn test_local_feedback_lists_skills() {
        let feedback = local_feedback(&kws(&["AWS", "Python"]));
        assert!(feedback.contains("skills like: AWS, Python."));
    }

    #[test]
    fn test_local_feedback_without_matches() {
        assert_eq!(
            local_feedback(&[]),
            "The resume did not match any of the required keywords."
        );
    }
}
