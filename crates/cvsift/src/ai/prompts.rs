//! Prompt construction for the extraction service.

/// Builds the fixed field-extraction prompt around one resume's text.
///
/// The service is instructed to reply with a single line of minified JSON
/// holding exactly the record keys, and nothing else. The inner JSON comes
/// back as text inside the completion reply and is decoded a second time by
/// the caller.
pub fn extraction_prompt(resume_text: &str) -> String {
    format!(
        r#"Extract resume information as strict minified JSON (one line, no line breaks, no extra text).

Expected structure:
{{"name":"", "email":"", "phone":"", "skills":["", "", ""], "experience":["", "", ""]}}

Only return this JSON. No explanations. No markdown.
Resume:
{resume_text}"#
    )
}
