//! Advice text for detected issues.

use posture_models::{Issue, IssueType};

/// Fixed advice for an issue type.
pub fn advice_for(issue_type: IssueType) -> &'static str {
    match issue_type {
        IssueType::KneeOverToe => {
            "Keep your knees aligned over your toes. Widen your stance and engage your glutes."
        }
        IssueType::ForwardLean => {
            "Keep your chest up and maintain a neutral spine. Engage your core muscles."
        }
        IssueType::ForwardHead => {
            "Pull your head back and align it over your shoulders. Imagine a string pulling the top of your head up."
        }
        IssueType::NeckBend => {
            "Keep your neck in a neutral position. Avoid looking down at screens for extended periods."
        }
        IssueType::Slouching => {
            "Sit up straight with your shoulders back. Use a lumbar support if needed."
        }
        IssueType::BackAngle => {
            "Straighten your back and keep your hips under your shoulders."
        }
        IssueType::ForwardHeadPosture => {
            "Tuck your chin slightly and bring your ears back in line with your shoulders."
        }
    }
}

/// One advice string per distinct issue type, in first-seen order.
///
/// Severity and confidence do not affect the text.
pub fn recommend(issues: &[Issue]) -> Vec<String> {
    let mut seen: Vec<IssueType> = Vec::with_capacity(issues.len());
    for issue in issues {
        if !seen.contains(&issue.issue_type) {
            seen.push(issue.issue_type);
        }
    }
    seen.into_iter().map(|t| advice_for(t).to_string()).collect()
}
