use super::{recent_history, speaker_label, ChatRequest, CoachContext};

fn language_name(code: &str) -> &'static str {
    match code {
        "tr" => "Turkish (Türkçe)",
        "es" => "Spanish (Español)",
        "pt" => "Portuguese (Português)",
        "de" => "German (Deutsch)",
        "fr" => "French (Français)",
        _ => "English",
    }
}

pub fn system_prompt(context: &CoachContext) -> String {
    let language = language_name(&context.language);
    let relationship = context
        .relationship_type
        .map(|t| t.label())
        .unwrap_or("Unspecified");

    format!(
        r#"You are Sona, a warm and trustworthy friend with deep knowledge of communication, psychology and relationships.

WHO YOU ARE TALKING TO:
User: {user}
Partner: {partner}
Relationship: {relationship} ({years} years, {months} months)
Situation: {challenge}
Goal: {goal}

Reply in {language}. Write short paragraphs, no headings, no bullet points.
Offer a concrete next step or a new perspective rather than only sympathy.
Never recommend medication or give a diagnosis. If the user mentions harming
themselves or others, stop coaching and encourage professional help."#,
        user = context.user_name,
        partner = context.partner_name.as_deref().unwrap_or("Partner"),
        years = context.years,
        months = context.months,
        challenge = context
            .main_challenge
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("Not specified"),
        goal = context.coaching_goal.map(|g| g.as_str()).unwrap_or("chat"),
    )
}

/// Full single-turn prompt: instructions, recent history, then the new message.
pub fn build_prompt(request: &ChatRequest) -> String {
    let history = recent_history(&request.history)
        .iter()
        .map(|m| format!("{}: {}", speaker_label(m.sender), m.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\n### CONVERSATION HISTORY\n{}\n\n### NEW MESSAGE\nUser: \"{}\"\nSona:",
        system_prompt(&request.context),
        history,
        request.message
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::chat::ChatMessage;
    use crate::models::relationship::RelationshipType;

    #[test]
    fn test_prompt_carries_context_and_message() {
        let request = ChatRequest {
            message: "We keep arguing about chores".into(),
            history: vec![ChatMessage::sona("1".into(), "Hi Deniz!".into(), Utc::now())],
            context: CoachContext {
                user_name: "Deniz".into(),
                partner_name: Some("Ana".into()),
                relationship_type: Some(RelationshipType::Romantic),
                years: 3,
                months: 4,
                language: "tr".into(),
                ..Default::default()
            },
        };

        let prompt = build_prompt(&request);
        assert!(prompt.contains("User: Deniz"));
        assert!(prompt.contains("Partner: Ana"));
        assert!(prompt.contains("(3 years, 4 months)"));
        assert!(prompt.contains("Turkish"));
        assert!(prompt.contains("Sona: Hi Deniz!"));
        assert!(prompt.ends_with("User: \"We keep arguing about chores\"\nSona:"));
    }

    #[test]
    fn test_unknown_language_defaults_to_english() {
        assert_eq!(language_name("xx"), "English");
    }
}
