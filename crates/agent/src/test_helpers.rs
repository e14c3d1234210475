//! Scripted collaborators for orchestrator tests.

use crate::orchestrator::{ConversationSettings, TurnOrchestrator};
use async_trait::async_trait;
use skimmer_core::conversation::SessionLog;
use skimmer_core::error::{ExtractionError, GenerationError, StorageError};
use skimmer_core::extractor::Extractor;
use skimmer_core::generator::{GenerationRequest, Generator};
use skimmer_core::storage::SessionStorage;
use skimmer_memory::{ConversationStore, InMemoryStorage};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// An extractor that returns the same outcome for every URL.
pub struct ScriptedExtractor {
    outcome: Result<String, ExtractionError>,
}

impl ScriptedExtractor {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
        }
    }

    pub fn failing(error: ExtractionError) -> Self {
        Self { outcome: Err(error) }
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn extract(&self, _url: &str) -> Result<String, ExtractionError> {
        self.outcome.clone()
    }
}

enum Script {
    Sequence(Mutex<VecDeque<Result<String, GenerationError>>>),
    Echo,
}

/// A generator that replays scripted outcomes and records every request.
///
/// Panics if called more times than it has outcomes.
pub struct ScriptedGenerator {
    script: Script,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn script(outcomes: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            script: Script::Sequence(Mutex::new(outcomes.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::script(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::script(vec![Err(error)])
    }

    /// Replies `"summary of {text}"` forever.
    pub fn echo() -> Self {
        Self {
            script: Script::Echo,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            Script::Echo => Ok(format!("summary of {}", request.text)),
            Script::Sequence(queue) => queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("ScriptedGenerator: no more outcomes")),
        }
    }
}

/// Storage whose writes always fail.
pub struct FailingStorage;

#[async_trait]
impl SessionStorage for FailingStorage {
    fn name(&self) -> &str {
        "failing"
    }

    async fn load(&self, _session_id: &str) -> Result<Option<SessionLog>, StorageError> {
        Ok(None)
    }

    async fn save(&self, session_id: &str, _log: &SessionLog) -> Result<(), StorageError> {
        Err(StorageError::Write {
            session_id: session_id.to_string(),
            reason: "read-only filesystem".into(),
        })
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        Ok(Vec::new())
    }
}

/// An orchestrator over in-memory storage, plus a handle on its generator.
pub fn orchestrator(
    extractor: ScriptedExtractor,
    generator: ScriptedGenerator,
) -> (TurnOrchestrator, Arc<ScriptedGenerator>) {
    let generator = Arc::new(generator);
    let orch = TurnOrchestrator::new(
        Arc::new(ConversationStore::new(Arc::new(InMemoryStorage::new()))),
        Arc::new(extractor),
        generator.clone(),
        ConversationSettings::default(),
    );
    (orch, generator)
}

pub fn orchestrator_with(
    storage: Arc<dyn SessionStorage>,
    extractor: ScriptedExtractor,
    generator: ScriptedGenerator,
) -> TurnOrchestrator {
    TurnOrchestrator::new(
        Arc::new(ConversationStore::new(storage)),
        Arc::new(extractor),
        Arc::new(generator),
        ConversationSettings::default(),
    )
}
