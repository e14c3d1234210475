//! `skimmer history | stats | clear`: Inspect and manage stored sessions.

use skimmer_memory::{ConversationStore, open_storage};
use std::path::Path;

async fn open_store(
    config_path: Option<&Path>,
) -> Result<ConversationStore, Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let storage = open_storage(&config.storage).await?;
    Ok(ConversationStore::new(storage))
}

pub async fn history(
    config_path: Option<&Path>,
    session_id: &str,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config_path).await?;
    let entries = match limit {
        Some(limit) => store.recent(session_id, limit).await?,
        None => store.history(session_id).await?,
    };

    if entries.is_empty() {
        println!("No entries for session {session_id}.");
        return Ok(());
    }

    for entry in &entries {
        let kind = entry.kind.map(|k| format!(" [{k}]")).unwrap_or_default();
        println!(
            "{} {}{kind}: {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.role,
            entry.content
        );
    }
    Ok(())
}

pub async fn stats(
    config_path: Option<&Path>,
    session_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config_path).await?;
    let stats = store.stats(session_id).await?;

    println!("Session:       {session_id}");
    println!("Entries:       {}", stats.count);
    println!("Created:       {}", stats.created_at.to_rfc3339());
    println!("Last accessed: {}", stats.last_accessed_at.to_rfc3339());
    Ok(())
}

pub async fn clear(
    config_path: Option<&Path>,
    session_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config_path).await?;
    store.clear(session_id).await?;
    println!("Cleared session {session_id}.");
    Ok(())
}
