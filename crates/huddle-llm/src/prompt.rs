// Prompt templates for team names and winner announcements, plus parsing of
// the team-name reply.

use anyhow::{anyhow, Context, Result};

use huddle_core::grouping::Theme;

/// Static system prompt shared by every request.
pub fn system_prompt() -> String {
    "You write short, upbeat copy for HR and office events such as year-end \
     parties and team-building days. Keep everything friendly, inclusive and \
     workplace-appropriate. Follow the requested output format exactly and \
     add nothing else."
        .to_string()
}

/// Ask for `count` team names in `theme`, returned as a JSON array.
pub fn team_names_prompt(count: usize, theme: Theme) -> String {
    format!(
        "Generate {count} creative team names for a corporate event.\n\
         Theme: {} ({}).\n\
         Return ONLY a JSON array of {count} strings, for example [\"Name A\", \"Name B\"].",
        theme.label(),
        theme.local_label(),
    )
}

/// Ask for a one-sentence announcement of `name` winning a prize.
pub fn announcement_prompt(name: &str) -> String {
    format!(
        "Create a short, exciting one-sentence announcement for {name} winning a prize \
         in the office lucky draw. Keep it fun and professional. Reply with the sentence only."
    )
}

/// Extract the JSON string array from a team-name reply.
///
/// Models sometimes wrap the array in prose or a code fence, so the outermost
/// `[...]` span is parsed.
pub fn parse_team_names(reply: &str) -> Result<Vec<String>> {
    let start = reply
        .find('[')
        .ok_or_else(|| anyhow!("no JSON array in reply"))?;
    let end = reply
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| anyhow!("unterminated JSON array in reply"))?;
    let names: Vec<String> =
        serde_json::from_str(&reply[start..=end]).context("reply array is not a list of strings")?;
    Ok(names.into_iter().map(|n| n.trim().to_string()).collect())
}
