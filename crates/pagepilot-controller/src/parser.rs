//! Parses `Thought: ... / Action: {json}` replies into instructions.

use pagepilot_protocols::Instruction;

use crate::error::ControllerError;

/// Split a reply into its thought text and its action instruction.
///
/// The thought may be empty. The action JSON is located by brace matching so
/// code fences and surrounding prose do not break parsing; a reply without a
/// deserializable action object is an error.
pub fn parse_reply(reply: &str) -> Result<(String, Instruction), ControllerError> {
    let thought = extract_thought(reply);

    let action_region = match reply.find("Action:") {
        Some(idx) => &reply[idx + "Action:".len()..],
        None => reply,
    };

    let json = extract_object(action_region).ok_or_else(|| {
        ControllerError::UnparseableReply("reply carries no action object".to_string())
    })?;

    let instruction: Instruction = serde_json::from_str(json)
        .map_err(|e| ControllerError::UnparseableReply(format!("bad action json: {e}")))?;

    Ok((thought, instruction))
}

fn extract_thought(reply: &str) -> String {
    let Some(start) = reply.find("Thought:") else {
        return String::new();
    };
    let after = &reply[start + "Thought:".len()..];
    let thought = match after.find("Action:") {
        Some(end) => &after[..end],
        None => after,
    };
    thought.trim().to_string()
}

/// Slice out the first balanced `{...}` object, honoring JSON string
/// literals so braces inside quoted content do not miscount.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_canonical_reply() {
        let reply = "Thought: the search box is label 3\nAction: {\"type\": \"Click\", \"label\": 3}";
        let (thought, instruction) = parse_reply(reply).unwrap();
        assert_eq!(thought, "the search box is label 3");
        assert_eq!(instruction, Instruction::Click { label: 3 });
    }

    #[test]
    fn test_parses_type_with_content() {
        let reply = "Thought: fill it in\nAction: {\"type\": \"Type\", \"label\": 12, \"content\": \"rust tutorials\"}";
        let (_, instruction) = parse_reply(reply).unwrap();
        assert_eq!(
            instruction,
            Instruction::Type {
                label: 12,
                content: "rust tutorials".into()
            }
        );
    }

    #[test]
    fn test_tolerates_code_fences() {
        let reply = "Thought: done here\nAction:\n```json\n{\"type\": \"Finish\"}\n```";
        let (thought, instruction) = parse_reply(reply).unwrap();
        assert_eq!(thought, "done here");
        assert!(instruction.is_finish());
    }

    #[test]
    fn test_tolerates_prose_around_the_object() {
        let reply = "Action: I will wait, so {\"type\": \"Wait\"} is my choice.";
        let (thought, instruction) = parse_reply(reply).unwrap();
        assert_eq!(thought, "");
        assert_eq!(instruction, Instruction::Wait);
    }

    #[test]
    fn test_braces_inside_strings_do_not_miscount() {
        let reply = r#"Action: {"type": "Type", "label": 1, "content": "braces {inside}"}"#;
        let (_, instruction) = parse_reply(reply).unwrap();
        assert_eq!(
            instruction,
            Instruction::Type {
                label: 1,
                content: "braces {inside}".into()
            }
        );
    }

    #[test]
    fn test_bare_object_without_markers() {
        let reply = r#"{"type": "Finish"}"#;
        let (thought, instruction) = parse_reply(reply).unwrap();
        assert_eq!(thought, "");
        assert!(instruction.is_finish());
    }

    #[test]
    fn test_missing_action_is_an_error() {
        let err = parse_reply("Thought: no idea what to do").unwrap_err();
        assert!(matches!(err, ControllerError::UnparseableReply(_)));
    }

    #[test]
    fn test_unknown_action_type_is_an_error() {
        let reply = r#"Action: {"type": "Teleport", "label": 4}"#;
        let err = parse_reply(reply).unwrap_err();
        assert!(matches!(err, ControllerError::UnparseableReply(_)));
    }

    #[test]
    fn test_unclosed_object_is_an_error() {
        let reply = r#"Action: {"type": "Click", "label": 4"#;
        let err = parse_reply(reply).unwrap_err();
        assert!(matches!(err, ControllerError::UnparseableReply(_)));
    }
}
