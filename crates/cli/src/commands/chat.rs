//! `skimmer chat`: Process one message through the full pipeline.

use skimmer_agent::InboundMessage;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    session: Option<String>,
    message: String,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let orchestrator = skimmer_agent::build_orchestrator(&config).await?;

    let session_id = match session {
        Some(id) => id,
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            eprintln!("Session: {id}");
            id
        }
    };

    let reply = orchestrator
        .handle(InboundMessage::new(session_id, message))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!("{}", reply.reply);
    }
    Ok(())
}
