//! Fixed HTML transcript templates.
//!
//! Two bubble templates with a single `{{MSG}}` substitution placeholder
//! each, plus the stylesheet that renders them. The display layer fills the
//! user bubble with the recovered (unwrapped) question and the assistant
//! bubble with the raw answer text.

use crate::chat::ConversationEngine;
use crate::models::ChatRole;

/// Substitution placeholder shared by both bubble templates.
pub const MSG_PLACEHOLDER: &str = "{{MSG}}";

pub const CSS: &str = r#"<style>
.chat-message {
    padding: 1rem;
    margin: 0.5rem 0;
    border-radius: 10px;
    display: flex;
    align-items: flex-start;
    gap: 0.8rem;
    max-width: 100%;
}
.chat-message.user {
    background-color: #e3f2fd;
    margin-left: 15%;
    flex-direction: row-reverse;
}
.chat-message.bot {
    background-color: #f5f5f5;
    margin-right: 15%;
}
.avatar {
    font-size: 1.5rem;
    width: 40px;
    height: 40px;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    flex-shrink: 0;
}
.message-content {
    flex: 1;
    line-height: 1.5;
    word-wrap: break-word;
}
</style>"#;

pub const USER_TEMPLATE: &str = r#"<div class="chat-message user">
    <div class="avatar user">&#128100;</div>
    <div class="message-content">{{MSG}}</div>
</div>"#;

pub const BOT_TEMPLATE: &str = r#"<div class="chat-message bot">
    <div class="avatar bot">&#129302;</div>
    <div class="message-content">{{MSG}}</div>
</div>"#;

/// Fill the user bubble with a recovered question.
pub fn render_user(message: &str) -> String {
    USER_TEMPLATE.replace(MSG_PLACEHOLDER, message)
}

/// Fill the assistant bubble with a raw answer.
pub fn render_assistant(message: &str) -> String {
    BOT_TEMPLATE.replace(MSG_PLACEHOLDER, message)
}

/// Render the full transcript as HTML bubbles, stylesheet first.
/// User turns show the original question, never the wrapped prompt.
pub fn render_transcript(engine: &ConversationEngine) -> String {
    let mut out = String::from(CSS);
    for (role, content) in engine.transcript() {
        out.push('\n');
        match role {
            ChatRole::Assistant => out.push_str(&render_assistant(&content)),
            _ => out.push_str(&render_user(&content)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_have_exactly_one_placeholder() {
        assert_eq!(USER_TEMPLATE.matches(MSG_PLACEHOLDER).count(), 1);
        assert_eq!(BOT_TEMPLATE.matches(MSG_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn render_substitutes_the_message() {
        let html = render_user("What is this about?");
        assert!(html.contains("What is this about?"));
        assert!(!html.contains(MSG_PLACEHOLDER));

        let html = render_assistant("I don't know.");
        assert!(html.contains("I don't know."));
        assert!(!html.contains(MSG_PLACEHOLDER));
    }
}
