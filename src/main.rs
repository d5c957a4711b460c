use std::sync::Arc;

use chatbot_debate::adapters::ai::build_reply_backend;
use chatbot_debate::adapters::http::{app_router, ChatAppState};
use chatbot_debate::adapters::storage::InMemoryConversationStore;
use chatbot_debate::application::handlers::{ChatOrchestrator, ChatSettings};
use chatbot_debate::config::AppConfig;
use chatbot_debate::domain::debate::{GenerationConstraints, PolicySettings, ReplyPolicy};
use chatbot_debate::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init_tracing(&config)?;

    let backend = build_reply_backend(&config)?;
    let policy = ReplyPolicy::new(PolicySettings {
        context_turns: config.debate.context_turns,
        constraints: GenerationConstraints {
            max_tokens: config.ai.max_tokens,
            temperature: config.ai.temperature,
        },
    });
    let settings = ChatSettings {
        max_per_side: config.debate.max_per_side,
        max_message_chars: config.debate.max_message_chars,
        max_topic_chars: config.debate.max_topic_chars,
    };
    let orchestrator = ChatOrchestrator::new(
        Arc::new(InMemoryConversationStore::new()),
        backend.clone(),
        policy,
        settings,
    );

    let router = app_router(ChatAppState::new(orchestrator), &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        backend = backend.name(),
        environment = ?config.server.environment,
        "Chatbot Debate API listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
