//! Turns a question plus dashboard data into the user turn's text.

use tally_core::error::{AssistantError, Result};
use tally_core::DashboardSnapshot;

/// First line of every formatted question.
pub const DATA_HEADER: &str = "Current Dashboard Data:";

/// Prefix of the line carrying the user's own words.
pub const QUESTION_PREFIX: &str = "User Question: ";

/// Render the prompt for one question.
///
/// ```text
/// Current Dashboard Data:
/// totalExpenses: 120.00
/// categories: Food: 80.00
///
/// User Question: What's my biggest category?
/// ```
///
/// Values are written as-is; they come from our own database, not from
/// the user.
pub fn format_question(question: &str, snapshot: &DashboardSnapshot) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AssistantError::invalid("Question cannot be empty"));
    }

    let mut prompt = String::from(DATA_HEADER);
    prompt.push('\n');
    for (label, value) in snapshot.iter() {
        prompt.push_str(&format!("{label}: {value}\n"));
    }
    prompt.push('\n');
    prompt.push_str(QUESTION_PREFIX);
    prompt.push_str(question);
    Ok(prompt)
}
