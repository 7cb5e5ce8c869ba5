//! Fan one prompt out to every selected provider and record each round.

use crate::ValidationError;
use crate::store::ConversationStore;
use config::Settings;
use fanout_ext::Attachment;
use futures::future::join_all;
use llm::{
    ChatMessage, ChatModel, ChatPayload, ChatRequest, GeneralModelProvider, LlmError,
    ProviderKind,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What happened for one provider in one dispatch.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub provider: ProviderKind,
    pub result: Result<String, LlmError>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The text recorded as the assistant turn: the reply, or the formatted error.
    pub fn message(&self) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(e) => error_turn(e),
        }
    }
}

/// One outcome per selected provider, in selection order.
#[derive(Debug)]
pub struct DispatchReport {
    /// User echo that names attached files without their content.
    pub display_text: String,
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    pub fn get(&self, provider: ProviderKind) -> Option<&DispatchOutcome> {
        self.outcomes.iter().find(|o| o.provider == provider)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Text sent to providers: the prompt followed by every attachment's transcript.
pub fn compose_outbound(prompt: &str, attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return prompt.to_string();
    }

    let transcripts = attachments
        .iter()
        .map(|a| format!("[file: {}]\n{}", a.name, a.transcript()))
        .collect::<Vec<_>>()
        .join("\n\n");

    if prompt.is_empty() {
        transcripts
    } else {
        format!("{}\n\n{}", prompt, transcripts)
    }
}

/// Text echoed back to the user: the prompt plus attached file names only.
pub fn compose_display(prompt: &str, attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return prompt.to_string();
    }

    let names = attachments
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    if prompt.is_empty() {
        format!("[Uploaded files: {}]", names)
    } else {
        format!("{}\n\n[Uploaded files: {}]", prompt, names)
    }
}

/// Assistant turn recorded when a provider call fails.
pub fn error_turn(error: &LlmError) -> String {
    let mut text = format!("Error sending message: {}", error);
    if let Some(fixes) = error.remediation() {
        text.push_str("\n\n**Suggested fixes:**\n");
        text.push_str(fixes);
    }
    text
}

pub struct DispatchCoordinator {
    store: ConversationStore,
    models: HashMap<ProviderKind, Arc<dyn ChatModel + Send + Sync>>,
    // Held from the user turn append to the assistant turn append
    rounds: Mutex<HashMap<ProviderKind, Arc<tokio::sync::Mutex<()>>>>,
}

impl DispatchCoordinator {
    pub fn new(store: ConversationStore) -> Self {
        Self {
            store,
            models: HashMap::new(),
            rounds: Mutex::new(HashMap::new()),
        }
    }

    /// Models for every provider with an API key in settings or the environment.
    /// Providers without a key stay unconfigured and fail individually when selected.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut coordinator = Self::new(ConversationStore::new(settings.history_limit));
        for kind in ProviderKind::ALL {
            match GeneralModelProvider::from_settings(kind, settings) {
                Ok(provider) => {
                    let model = provider.model_from_settings(settings);
                    info!(provider = kind.id(), model = model.name(), "Provider configured");
                    coordinator.set_model(model);
                }
                Err(e) => debug!(provider = kind.id(), error = %e, "Provider not configured"),
            }
        }
        coordinator
    }

    pub fn with_model(mut self, model: Arc<dyn ChatModel + Send + Sync>) -> Self {
        self.set_model(model);
        self
    }

    /// Install or replace the model serving `model.provider()`.
    pub fn set_model(&mut self, model: Arc<dyn ChatModel + Send + Sync>) {
        self.models.insert(model.provider(), model);
    }

    pub fn model(&self, provider: ProviderKind) -> Option<&Arc<dyn ChatModel + Send + Sync>> {
        self.models.get(&provider)
    }

    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|p| self.models.contains_key(p))
            .collect()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Send `prompt` with `attachments` to every provider in `selected`
    /// concurrently. Provider failures are reported per provider and never
    /// fail the dispatch; only the preconditions do.
    #[instrument(level = "debug", skip(self, prompt, attachments), fields(attachments = attachments.len()))]
    pub async fn dispatch(
        &self,
        prompt: &str,
        attachments: &[Attachment],
        selected: &[ProviderKind],
    ) -> Result<DispatchReport, ValidationError> {
        if selected.is_empty() {
            return Err(ValidationError::NoProvidersSelected);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() && attachments.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        let mut providers = Vec::with_capacity(selected.len());
        for provider in selected {
            if !providers.contains(provider) {
                providers.push(*provider);
            }
        }

        let text = compose_outbound(prompt, attachments);
        let images = attachments.iter().filter_map(Attachment::image_block).collect();
        let payload = ChatPayload::with_images(text.clone(), images);

        let outcomes = join_all(
            providers
                .iter()
                .map(|provider| self.run_round(*provider, &text, &payload)),
        )
        .await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(providers = outcomes.len(), failed, "Dispatch complete");

        Ok(DispatchReport {
            display_text: compose_display(prompt, attachments),
            outcomes,
        })
    }

    async fn run_round(
        &self,
        provider: ProviderKind,
        text: &str,
        payload: &ChatPayload,
    ) -> DispatchOutcome {
        let round = self.round_lock(provider);
        let _round = round.lock().await;

        let history = self.store.history(provider);
        self.store
            .append(provider, ChatMessage::user(ChatPayload::text(text)));

        let result = match self.models.get(&provider) {
            Some(model) => {
                let request = ChatRequest::with_prompt(history.iter(), payload.clone());
                model.chat(&request).await.map(|reply| reply.get_text())
            }
            None => Err(LlmError::NotConfigured { provider }),
        };

        let outcome = DispatchOutcome { provider, result };
        if let Err(e) = &outcome.result {
            warn!(provider = provider.id(), error = %e, "Provider call failed");
        }
        self.store
            .append(provider, ChatMessage::assistant(outcome.message().into()));
        outcome
    }

    fn round_lock(&self, provider: ProviderKind) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.rounds.lock().entry(provider).or_default())
    }
}
