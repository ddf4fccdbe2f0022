//! Prompt composition for the search path.
//!
//! Pure and deterministic: the same query, matches and history always yield
//! the same message sequence. The branch is decided once from whether any
//! relevant match survived filtering.

use ai_llm_service::types::ChatMessage;

use crate::api_types::SearchMatch;
use crate::history::ConversationTurn;

/// System instruction shared by both branches.
pub const SYSTEM_PROMPT: &str = "You are a helpful and friendly assistant 🤖. Always respond in the same language as the user's query, using a friendly tone and emojis to make the response engaging 🌟. \n\
When providing guidance, offer clear step-by-step instructions with examples to help the user. \n\
Focus on being approachable, helpful, and delightful in all responses 😊";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptBranch {
    /// No relevant match: help the user refine the query.
    Fallback,
    /// Answer from the top relevant match.
    Contextual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrompt {
    pub branch: PromptBranch,
    pub messages: Vec<ChatMessage>,
}

/// Builds `[system, ...history, user]` for the chosen branch.
///
/// Only the first of `filtered` is rendered on the contextual branch.
pub fn compose(
    query: &str,
    filtered: &[SearchMatch],
    history: &[ConversationTurn],
) -> ComposedPrompt {
    let (branch, user_prompt) = match filtered.first() {
        None => (PromptBranch::Fallback, fallback_prompt(query)),
        Some(top) => (PromptBranch::Contextual, contextual_prompt(query, top)),
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(user_prompt));

    ComposedPrompt { branch, messages }
}

fn language_instructions(query: &str) -> String {
    format!(
        "Internally, determine the language of the query: \"{query}\" to ensure your response matches the user's language.\n\
Do not explicitly state the detected language in your response. Instead, proceed directly to providing assistance in the same language as the query.\n\
Make your response friendly, instructional, and delightful 😊."
    )
}

fn fallback_prompt(query: &str) -> String {
    format!(
        "The user asked: \"{query}\".\n\
Unfortunately, no relevant products were found for their query. 🤔 But don't worry!\n\
You are a helpful and friendly assistant 🤖. Always respond in the same language as the user's query, using a friendly tone and emojis to make the response engaging 🌟.\n\
\n\
Provide clear step-by-step guidance to help the user refine their query or explore alternatives.\n\
For example:\n\
- Suggest providing more details like the region (e.g., \"eSIM for Canada\").\n\
- Recommend specifying data needs (e.g., \"2GB/day\" or \"unlimited data\").\n\
- Ask for validity requirements (e.g., \"7 days\" or \"30 days\").\n\
\n\
{}",
        language_instructions(query)
    )
}

fn contextual_prompt(query: &str, top: &SearchMatch) -> String {
    format!(
        "You are a helpful and friendly assistant 🤖. Always respond in the same language as the user's query, using a friendly tone and emojis to make the response engaging 🌟.\n\
When providing guidance, offer clear step-by-step instructions with examples to help the user.\n\
Focus on being approachable, helpful, and delightful in all responses 😊.\n\
The user asked: \"{query}\".\n\
Here are the top product matches:\n\
1. {}: {}\n\
{}",
        top.name,
        top.description,
        language_instructions(query)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::types::Role;

    fn hit(id: &str, name: &str, description: &str, score: f32) -> SearchMatch {
        SearchMatch {
            id: id.into(),
            score,
            name: name.into(),
            description: description.into(),
            kind: "esim".into(),
            group_id: String::new(),
            action: None,
        }
    }

    #[test]
    fn empty_matches_select_fallback() {
        let p = compose("eSIM para Japón", &[], &[]);
        assert_eq!(p.branch, PromptBranch::Fallback);
        assert_eq!(p.messages.len(), 2);
        assert_eq!(p.messages[0].role, Role::System);
        assert_eq!(p.messages[0].content, SYSTEM_PROMPT);

        let user = &p.messages[1].content;
        assert!(user.contains("The user asked: \"eSIM para Japón\""));
        assert!(user.contains("eSIM for Canada"));
        assert!(user.contains("2GB/day"));
        assert!(user.contains("30 days"));
        assert!(user.contains("Do not explicitly state the detected language"));
    }

    #[test]
    fn contextual_renders_only_the_first_match() {
        let matches = [
            hit("a", "Japan 5GB", "Fast data", 0.95),
            hit("b", "Korea 3GB", "Other", 0.9),
        ];
        let p = compose("japan data", &matches, &[]);
        assert_eq!(p.branch, PromptBranch::Contextual);

        let user = &p.messages[1].content;
        assert!(user.contains("Japan 5GB: Fast data"));
        assert!(!user.contains("Korea 3GB"));
        assert!(user.contains("Here are the top product matches:"));
    }

    #[test]
    fn history_sits_between_system_and_user_verbatim() {
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello!"),
        ];
        let p = compose("q", &[], &history);
        let roles: Vec<Role> = p.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(p.messages[1].content, "hi");
        assert_eq!(p.messages[2].content, "hello!");
    }

    #[test]
    fn composition_is_deterministic() {
        let matches = [hit("a", "n", "d", 0.9)];
        let h = [ConversationTurn::user("x")];
        assert_eq!(compose("q", &matches, &h), compose("q", &matches, &h));
    }
}
