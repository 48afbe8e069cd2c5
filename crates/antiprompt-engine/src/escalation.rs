//! Escalation payload for an external language model
//!
//! Building the payload is pure data production; invoking a model with it
//! is left to the caller.

use antiprompt_core::{EscalationMode, InversionRequest, SystemPromptChoice};

const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.txt");
const PROMPT_1_TEMPLATE: &str = include_str!("../templates/prompt_1.txt");
const PROMPT_2_TEMPLATE: &str = include_str!("../templates/prompt_2.txt");

/// Canned system instruction for a choice
pub fn template(choice: SystemPromptChoice) -> &'static str {
    let text = match choice {
        SystemPromptChoice::Default => DEFAULT_TEMPLATE,
        SystemPromptChoice::Prompt1 => PROMPT_1_TEMPLATE,
        SystemPromptChoice::Prompt2 => PROMPT_2_TEMPLATE,
    };
    text.trim()
}

/// The custom system prompt when it has content, otherwise the chosen template
pub fn system_prompt(request: &InversionRequest) -> &str {
    match request.custom_system_prompt.as_deref().map(str::trim) {
        Some(custom) if !custom.is_empty() => custom,
        _ => template(request.system_prompt_choice),
    }
}

/// Full escalation wins over fallback; fallback needs at least one
/// unresolved tag
pub fn escalation_mode(request: &InversionRequest, unresolved: &[String]) -> Option<EscalationMode> {
    if request.use_llm_full {
        Some(EscalationMode::Full)
    } else if request.use_llm_fallback && !unresolved.is_empty() {
        Some(EscalationMode::Fallback)
    } else {
        None
    }
}

/// System instruction and body separated by a blank line
pub fn build_payload(system_prompt: &str, body: &str) -> String {
    format!("{system_prompt}\n\n{body}")
}

/// Payload for the given mode: the whole negative prompt, or the unresolved
/// tags joined with ", "
pub fn escalation_payload(
    request: &InversionRequest,
    mode: EscalationMode,
    unresolved: &[String],
) -> String {
    let body = match mode {
        EscalationMode::Full => request.negative_prompt.clone(),
        EscalationMode::Fallback => unresolved.join(", "),
    };
    build_payload(system_prompt(request), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> InversionRequest {
        InversionRequest::new("a portrait", "blurry, xyzzytag")
    }

    #[test]
    fn test_templates_are_distinct_and_trimmed() {
        let default = template(SystemPromptChoice::Default);
        let first = template(SystemPromptChoice::Prompt1);
        let second = template(SystemPromptChoice::Prompt2);

        assert!(default.starts_with("You are an AI assistant specializing"));
        assert!(first.starts_with("You are an AI specialized in transforming"));
        assert!(second.starts_with("As an AI image prompt converter"));
        for text in [default, first, second] {
            assert_eq!(text, text.trim());
            assert!(text.ends_with(':'));
        }
    }

    #[test]
    fn test_mode_selection() {
        let unresolved = vec!["xyzzytag".to_string()];

        assert_eq!(escalation_mode(&request(), &unresolved), None);
        assert_eq!(
            escalation_mode(&request().with_llm_fallback(true), &unresolved),
            Some(EscalationMode::Fallback)
        );
        assert_eq!(escalation_mode(&request().with_llm_fallback(true), &[]), None);
        assert_eq!(
            escalation_mode(&request().with_llm_full(true).with_llm_fallback(true), &unresolved),
            Some(EscalationMode::Full)
        );
        assert_eq!(
            escalation_mode(&request().with_llm_full(true), &[]),
            Some(EscalationMode::Full)
        );
    }

    #[test]
    fn test_fallback_payload() {
        let request = request().with_system_prompt(SystemPromptChoice::Prompt2);
        let unresolved = vec!["xyzzytag".to_string(), "plugh".to_string()];
        let payload = escalation_payload(&request, EscalationMode::Fallback, &unresolved);

        assert!(payload.starts_with(template(SystemPromptChoice::Prompt2)));
        assert!(payload.ends_with("\n\nxyzzytag, plugh"));
    }

    #[test]
    fn test_full_payload_uses_whole_prompt() {
        let payload = escalation_payload(&request(), EscalationMode::Full, &[]);
        assert_eq!(
            payload,
            format!("{}\n\nblurry, xyzzytag", template(SystemPromptChoice::Default))
        );
    }

    #[test]
    fn test_custom_prompt_overrides_choice() {
        let custom = request()
            .with_system_prompt(SystemPromptChoice::Prompt1)
            .with_custom_system_prompt("Invert these tags:");
        assert_eq!(system_prompt(&custom), "Invert these tags:");

        let blank = request().with_custom_system_prompt("   ");
        assert_eq!(system_prompt(&blank), template(SystemPromptChoice::Default));
    }
}
