//! System prompt and user-turn builders for the browsing agent.

use pagepilot_protocols::ActionResult;

use crate::chat::{ChatMessage, ContentPart, ImageUrl};

/// Fixed instructions sent as the system message on every completion call.
///
/// The action JSON shapes must stay in sync with `Instruction`; the parser
/// deserializes exactly what this prompt documents.
pub const SYSTEM_PROMPT: &str = r#"Imagine you are a robot browsing the web, just like humans. Now you need to complete a task.
In each iteration you will receive an Observation: a screenshot of a webpage.
The screenshot features numerical labels placed in the top-left corner of each interactive web element.
Carefully analyze the screenshot to identify the numerical label of the element that requires interaction, then choose one of the following actions:

1. Click a web element.
2. Delete the existing content of a textbox and then type new content.
3. Wait for the page to load.
4. Finish with the task.

The Action must STRICTLY follow the JSON format below, as a single JSON object:

- { "type": "Click", "label": <number> }
- { "type": "Type", "label": <number>, "content": <string> }
- { "type": "Wait" }
- { "type": "Finish" }

Key guidelines you MUST follow:

* Action guidelines *
1) Execute only one action per iteration.
2) When clicking or typing, make sure the label matches an element that can actually be clicked or typed into.
3) Numerical labels lie in the top-left corner of their bounding boxes and share their color.

* Web browsing guidelines *
1) Do not interact with irrelevant elements such as login, sign-in or donation prompts.
2) Select elements strategically to minimize wasted iterations.

Your reply must strictly follow this format:
Thought: {your brief thoughts}
Action: {one action in the JSON format above}

The user will then provide the next Observation."#;

/// Build the user turn for a fresh action result.
///
/// The first turn states the task; later turns just hand over the new
/// screenshot. Error results lead with the failure so the agent picks
/// something else.
pub fn screenshot_turn(result: &ActionResult, task: &str, first: bool) -> ChatMessage {
    let text = match result.error_message() {
        Some(message) => format!("{message}, what should we do next instead?"),
        None if first => task.to_string(),
        None => "Here is the next screenshot, what should we do next?".to_string(),
    };
    ChatMessage::user_parts(vec![
        ContentPart::Text { text },
        ContentPart::ImageUrl {
            image_url: ImageUrl::png_data(result.screenshot()),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_documents_every_action() {
        for variant in ["\"Click\"", "\"Type\"", "\"Wait\"", "\"Finish\""] {
            assert!(SYSTEM_PROMPT.contains(variant), "missing {variant}");
        }
        assert!(SYSTEM_PROMPT.contains("Thought:"));
        assert!(SYSTEM_PROMPT.contains("Action:"));
    }

    #[test]
    fn test_first_turn_states_the_task() {
        let result = ActionResult::success("cGl4ZWxz");
        let msg = screenshot_turn(&result, "find the pricing page", true);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["text"], "find the pricing page");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "data:image/png;base64,cGl4ZWxz"
        );
        assert_eq!(json["content"][1]["image_url"]["detail"], "high");
    }

    #[test]
    fn test_later_turns_hand_over_the_screenshot() {
        let result = ActionResult::success("cGl4ZWxz");
        let msg = screenshot_turn(&result, "find the pricing page", false);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json["content"][0]["text"],
            "Here is the next screenshot, what should we do next?"
        );
    }

    #[test]
    fn test_error_turn_leads_with_the_failure() {
        let result = ActionResult::error("element 7 is not clickable", "cGl4ZWxz");
        let msg = screenshot_turn(&result, "find the pricing page", false);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json["content"][0]["text"],
            "element 7 is not clickable, what should we do next instead?"
        );
    }
}
