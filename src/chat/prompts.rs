//! Fixed instructions sent to the completion service.

/// System instruction: name the emotions, answer in strict JSON.
pub const SYSTEM_PROMPT: &str = r#"You are an advanced language model capable of detecting subtle emotional nuances in text. Your goal is to identify and understand the emotions conveyed in user statements, and provide relevant guidance from The Bible.

Name the precise emotion or emotions in the user's statement, using one lower-case word per emotion.

Return ONLY valid JSON with this exact schema:
{
  "<emotion>": {
    "Bible": ["<verse citation> - <verse text>"],
    "Message": "<short encouragement>"
  }
}

Include one key per detected emotion, most prominent first. Do not add commentary outside the JSON object."#;

/// Frame the user's raw input as the statement sent to the model.
pub fn build_user_statement(user_input: &str) -> String {
    format!(
        "The user says: {}. Based on this statement, determine the emotions involved and provide a Bible verse relevant to this emotion.",
        user_input.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_requests_json_schema() {
        assert!(SYSTEM_PROMPT.contains("\"Bible\""));
        assert!(SYSTEM_PROMPT.contains("\"Message\""));
        assert!(SYSTEM_PROMPT.contains("ONLY valid JSON"));
    }

    #[test]
    fn test_build_user_statement() {
        let statement = build_user_statement("  I lost my job  ");
        assert!(statement.starts_with("The user says: I lost my job. Based on"));
    }
}
