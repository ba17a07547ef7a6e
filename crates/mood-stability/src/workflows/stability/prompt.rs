use super::domain::Scale;

/// Closing request appended to a conversation when asking for an assessment.
pub const ASSESSMENT_REQUEST: &str = "Based on our conversation, can you provide a complete \
assessment of my mood in JSON format? Include values for all scales, sleep hours if \
mentioned, and any relevant comments.";

const ASSESSMENT_FORMAT: &str = r#"```json
{
  "scaleValues": [
    {"scaleId": "<id>", "scaleName": "<name>", "value": <level>}
  ],
  "sleepHours": <number or null>,
  "comment": "<brief overall assessment>",
  "medication": "<any medication mentioned or empty string>"
}
```"#;

fn scale_heading(scale: &Scale) -> String {
    format!("{} ({}-{})", scale.name, scale.min_value, scale.max_value)
}

fn level_lines(scale: &Scale) -> String {
    scale
        .levels
        .iter()
        .map(|level| format!("    - {}: {}", level.level, level.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// System prompt for free conversation, allowing a preliminary assessment.
pub fn build_chat_prompt(scales: &[Scale]) -> String {
    let descriptions = scales
        .iter()
        .map(|scale| {
            format!(
                "- {}: {}\n  Levels:\n{}",
                scale_heading(scale),
                scale.description,
                level_lines(scale)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an empathetic mental health assistant specialized in mood tracking.\n\
You help users track their mood and mental state using the following scales:\n\n\
{descriptions}\n\n\
When talking with users:\n\
1. Be conversational and empathetic while gathering relevant information\n\
2. Ask questions to understand their current mental state\n\
3. Assess their mood from their answers\n\
4. When you have enough information, you may give a preliminary assessment\n\n\
If you give an assessment, include JSON in this format:\n\
{ASSESSMENT_FORMAT}\n"
    )
}

/// System prompt asking for a full assessment of every scale.
pub fn build_assessment_prompt(scales: &[Scale]) -> String {
    let summary = scales
        .iter()
        .map(|scale| format!("- {}: {}", scale_heading(scale), scale.description))
        .collect::<Vec<_>>()
        .join("\n");
    let details = scales
        .iter()
        .map(|scale| {
            format!(
                "## {}\n{}\n\nLevels:\n{}",
                scale_heading(scale),
                scale.description,
                level_lines(scale)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    let ids = scales
        .iter()
        .map(|scale| format!("- \"{}\" for {}", scale.id, scale.name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a mental health assessment expert. Analyze the conversation with the user \
and assess their mood on the following scales:\n\n\
{summary}\n\n\
For each scale, pick the most appropriate value from what the user shared.\n\n\
{details}\n\n\
When asked for an assessment, return a JSON object in this format:\n\
{ASSESSMENT_FORMAT}\n\n\
Include values for ALL scales, even if you have to make an educated guess. Use the middle \
of the scale when you lack information.\n\n\
Always use these exact scaleId values:\n\
{ids}\n"
    )
}
