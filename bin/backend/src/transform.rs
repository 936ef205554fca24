use std::sync::Arc;

use tonelift_core::llm::OpenAiHost;
use tonelift_core::workbench::FormState;
use tonelift_core::{RenderState, Situation, ToneWorkbench, TransformResponse};

use crate::opts::{AiOpts, TransformArgs};

const UNSUPPORTED: &str =
    "AI capability is not available. Check the AI base URL and API key settings.";

pub async fn run(ai: AiOpts, args: TransformArgs) -> anyhow::Result<()> {
    let host = Arc::new(OpenAiHost::new(ai.host_config()));
    let mut view = ToneWorkbench::mount(host, ai.temperature).await;

    view.form = FormState {
        text: args.text,
        situation: args.situation,
        formality: args.formality,
        custom_context: args.context.unwrap_or_default(),
    };
    view.submit().await;

    let outcome = match view.render_state() {
        RenderState::Unsupported => Err(anyhow::anyhow!(UNSUPPORTED)),
        RenderState::Error(message) => Err(anyhow::anyhow!("{message}")),
        RenderState::Result(result) if args.json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        RenderState::Result(result) => {
            print!("{}", render_result(result));
            Ok(())
        }
        RenderState::Idle | RenderState::Loading => {
            Err(anyhow::anyhow!("transform finished without a result"))
        }
    };

    view.unmount();
    outcome
}

pub fn render_result(result: &TransformResponse) -> String {
    let mut out = format!("Transformed Message\n  {}\n\nKey Improvements:\n", result.transformed_text);
    for improvement in &result.improvements {
        out.push_str(&format!("  ✓ {improvement}\n"));
    }
    out
}

pub fn print_situations() {
    for situation in enum_iterator::all::<Situation>() {
        println!("{:<24} {}", situation.to_string(), situation.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonelift_core::Improvements;

    #[test]
    fn test_render_result_lists_improvements() {
        let result = TransformResponse {
            original_text: "no".into(),
            transformed_text: "Unfortunately not this time.".into(),
            improvements: Improvements::from(vec!["Softer".to_string(), "Polite".to_string()]),
        };
        let rendered = render_result(&result);
        assert!(rendered.starts_with("Transformed Message\n  Unfortunately not this time.\n"));
        assert!(rendered.contains("  ✓ Softer\n  ✓ Polite\n"));
    }
}
