use crate::model::TransformOptions;

const EMPATHY_CLAUSE: &str = "Use empathetic language. Show understanding. Focus on solutions.";
const LANGUAGE_CLAUSE: &str = "Respond in English only.";

/// Builds the context string handed to the rewriter.
///
/// One clause per line: the situation template, the formality clause, the
/// fixed empathy and language instructions, then the caller's extra context
/// when it is not blank.
pub fn build_context(options: &TransformOptions) -> String {
    let mut parts = vec![
        format!("{}.", options.situation.template()),
        format!("Make it {}.", options.formality.clause()),
        EMPATHY_CLAUSE.to_string(),
        LANGUAGE_CLAUSE.to_string(),
    ];

    if let Some(extra) = options
        .additional_context
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        parts.push(extra.to_string());
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Formality, Situation};

    #[test]
    fn test_client_formal_context() {
        let ctx = build_context(&TransformOptions {
            situation: Situation::Client,
            formality: Formality::Formal,
            additional_context: None,
        });
        assert_eq!(
            ctx,
            "Transform into professional, empathetic business communication.\n\
             Make it professional and polite.\n\
             Use empathetic language. Show understanding. Focus on solutions.\n\
             Respond in English only."
        );
    }

    #[test]
    fn test_casual_with_extra_context() {
        let ctx = build_context(&TransformOptions {
            situation: Situation::Personal,
            formality: Formality::Casual,
            additional_context: Some("  It's for my sister  ".into()),
        });
        assert!(ctx.starts_with("Modify to caring, considerate personal message."));
        assert!(ctx.contains("Make it friendly and warm."));
        assert!(ctx.ends_with("\nIt's for my sister"));
    }

    #[test]
    fn test_blank_extra_context_is_dropped() {
        let ctx = build_context(&TransformOptions {
            additional_context: Some("   ".into()),
            ..Default::default()
        });
        assert!(ctx.ends_with(LANGUAGE_CLAUSE));
    }
}
