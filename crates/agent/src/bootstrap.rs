//! Wire a [`TurnOrchestrator`] from configuration.

use crate::orchestrator::{ConversationSettings, TurnOrchestrator};
use skimmer_config::AppConfig;
use skimmer_core::error::Error;
use skimmer_extract::WebExtractor;
use skimmer_memory::{ConversationStore, open_storage};
use std::sync::Arc;
use tracing::info;

/// Open storage and build the extraction and generation backends named in `config`.
pub async fn build_orchestrator(config: &AppConfig) -> Result<TurnOrchestrator, Error> {
    let storage = open_storage(&config.storage).await?;
    let store = Arc::new(ConversationStore::new(storage));
    let extractor = Arc::new(WebExtractor::from_config(&config.extraction)?);
    let generator = skimmer_providers::build_from_config(config);

    info!(
        storage = store.backend(),
        generator = generator.name(),
        "Orchestrator ready"
    );

    Ok(TurnOrchestrator::new(
        store,
        extractor,
        generator,
        ConversationSettings::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{InboundMessage, NO_CONTEXT_REPLY};

    #[tokio::test]
    async fn builds_from_memory_config() {
        let mut config = AppConfig::default();
        config.storage.backend = "memory".into();
        config.conversation.followup_history = 4;

        let orch = build_orchestrator(&config).await.unwrap();
        assert_eq!(orch.store().backend(), "memory");
        assert_eq!(orch.settings().followup_history, 4);

        // No key configured: the turn still completes.
        let reply = orch
            .handle(InboundMessage::new("s", "anything new"))
            .await
            .unwrap();
        assert_eq!(reply.reply, NO_CONTEXT_REPLY);
    }

    #[tokio::test]
    async fn unknown_backend_is_a_storage_error() {
        let mut config = AppConfig::default();
        config.storage.backend = "tape".into();
        assert!(matches!(
            build_orchestrator(&config).await,
            Err(Error::Storage(_))
        ));
    }
}
