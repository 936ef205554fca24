use crate::{api, opts::*};

use std::sync::Arc;

use atb_tokio_ext::shutdown_signal;
use tokio::net::TcpListener;
use tonelift_core::ToneTransformer;
use tonelift_core::llm::OpenAiHost;

pub async fn run(http_opts: HttpOpts, ai_opts: AiOpts) -> anyhow::Result<()> {
    let host = Arc::new(OpenAiHost::new(ai_opts.host_config()));
    let mut transformer = ToneTransformer::new(host);
    if !transformer.initialize(ai_opts.temperature).await {
        tracing::warn!(
            base_url = %ai_opts.ai_base_url,
            "AI capability unavailable, transform requests will be rejected"
        );
    }

    let app_state = api::state::AppState::new(transformer);
    start_http(http_opts, app_state).await
}

pub async fn start_http(http_opts: HttpOpts, app_state: api::state::AppState) -> anyhow::Result<()> {
    tracing::info!("http listening on {}", http_opts.host);
    let app = api::build_app(&http_opts, app_state)?;
    let listener = TcpListener::bind(&http_opts.host).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
