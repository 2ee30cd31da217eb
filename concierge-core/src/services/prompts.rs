use crate::domain::Session;

pub const SYSTEM_STYLE: &str = "You are an admissions support assistant for a selective university.
You must be helpful, accurate, and ethical.
- Do not guarantee admission or provide predictions.
- Encourage integrity and authentic representation.
- When unsure, ask for clarifying details or recommend contacting the admissions office.
- Provide concise next steps and (when possible) cite relevant policy snippets from the provided documents.
";

const MESSAGE_FIELD: &str = "User message: ";

/// Applicant framing handed to the generator alongside [`SYSTEM_STYLE`].
pub fn build_user_prompt(session: &Session, message: &str) -> String {
    format!(
        "Applicant name: {}\nApplicant segment: {}\nTarget program: {}\n{MESSAGE_FIELD}{}",
        session.display_name,
        session.segment.describe(),
        session.target_program,
        message
    )
}

/// The raw applicant message inside a prompt built by [`build_user_prompt`];
/// any other text is returned unchanged.
pub fn message_of(prompt: &str) -> &str {
    match prompt.find(MESSAGE_FIELD) {
        Some(at) => &prompt[at + MESSAGE_FIELD.len()..],
        None => prompt,
    }
}
