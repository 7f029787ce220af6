//! Chat and emergency controllers.
//!
//! A [`Session`] owns the configuration, transcript, status and dialogs. Every
//! round trip is split in three so a front end never blocks while waiting:
//!
//! 1. `begin_*` runs the synchronous steps (preconditions, user message,
//!    loading placeholder, status) and hands back a pending request,
//! 2. the pending request's `run()` performs the HTTP call and owns only
//!    cloned data, so it can be spawned,
//! 3. `finish_*` applies the result back onto the session.
//!
//! `send_message`, `trigger_emergency` and `check_connection` chain the three
//! steps for callers that can simply await.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ChatRequest, ChatResponse, ChatTransport};
use crate::config::{ClientConfig, ConfigStore};
use crate::dialog::{ConfigDialog, EmergencyDialog, TextField, DEFAULT_EMERGENCY_REASON};
use crate::error::{ConfigError, TransportError};
use crate::feedback::{DeviceFeedback, EMERGENCY_TONE, EMERGENCY_VIBRATION_MS};
use crate::quick_action::QuickAction;
use crate::state::{Message, Transcript};
use crate::status::{StatusIndicator, StatusKind};
use crate::store::KeyValueStore;

/// Marker the backend uses to route a message to its emergency agent.
pub const EMERGENCY_PREFIX: &str = "URGENCE: ";

pub const STATUS_READY: &str = "Prêt";
pub const STATUS_LOADING: &str = "Traitement...";
pub const STATUS_CONNECTION_ERROR: &str = "Erreur de connexion";
pub const STATUS_CONFIG_REQUIRED: &str = "Configuration requise";
pub const STATUS_EMERGENCY_ACTIVE: &str = "🚨 URGENCE EN COURS";
pub const STATUS_EMERGENCY_HANDLED: &str = "Urgence traitée";
pub const STATUS_EMERGENCY_FAILED: &str = "Erreur - Appelez les urgences!";
pub const STATUS_UNREACHABLE: &str = "API injoignable";
pub const STATUS_SAVE_FAILED: &str = "Erreur de sauvegarde";

pub const CONFIG_MISSING_NOTICE: &str =
    "⚠️ Veuillez configurer l'URL de l'API d'abord";

pub const EMERGENCY_CONFIRM_PROMPT: &str = "⚠️ ALERTE D'URGENCE\n\n\
     Voulez-vous vraiment déclencher une alerte d'urgence?\n\n\
     Vos contacts d'urgence seront immédiatement prévenus.";

pub const EMERGENCY_REASON_PROMPT: &str =
    "Que se passe-t-il?\n\nDécrivez brièvement votre situation:";

/// Shown when the backend can't be reached during an emergency.
pub const EMERGENCY_FALLBACK: &str = "🚨 URGENCE DÉTECTÉE\n\n\
     En cas de danger immédiat:\n\n\
     📞 Appelez le 15 (SAMU)\n\
     📞 Appelez le 18 (Pompiers)\n\
     📞 Appelez le 112 (Urgences)\n\n\
     Ne restez pas seul(e)!";

fn troubleshooting_message(err: &TransportError) -> String {
    format!(
        "😔 Désolé, je rencontre une difficulté technique.\n\n\
         Vérifiez que:\n\
         • L'URL de l'API est correcte\n\
         • Vous êtes connecté à Internet\n\
         • L'API est bien déployée\n\n\
         Erreur: {}",
        err
    )
}

fn config_saved_message(config: &ClientConfig) -> String {
    format!(
        "✅ Configuration sauvegardée!\n\nAPI: {}\nUtilisateur: {}",
        config.api_base_url, config.user_id
    )
}

/// Blocking yes/no and free-text questions, for callers that drive the
/// emergency flow without the [`EmergencyDialog`] state machine.
pub trait UserPrompt {
    fn confirm(&mut self, message: &str) -> bool;
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
}

pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// A round trip is already in flight.
    Busy,
    /// No API URL; the configuration dialog was opened instead.
    ConfigMissing,
    Sent(PendingChat),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent(_))
    }
}

/// A chat request detached from the session, ready to be awaited or spawned.
pub struct PendingChat {
    transport: Arc<dyn ChatTransport>,
    endpoint: String,
    request: ChatRequest,
}

impl PendingChat {
    pub async fn run(self) -> Result<ChatResponse, TransportError> {
        debug!(endpoint = %self.endpoint, "sending chat request");
        self.transport.send(&self.endpoint, &self.request).await
    }
}

/// Same as [`PendingChat`], except that a missing API URL still yields a
/// request which fails locally, so the fallback is always shown.
pub struct PendingEmergency {
    chat: Option<PendingChat>,
}

impl PendingEmergency {
    pub async fn run(self) -> Result<ChatResponse, TransportError> {
        match self.chat {
            Some(chat) => chat.run().await,
            None => Err(TransportError::NotConfigured),
        }
    }
}

pub struct PendingHealth {
    transport: Arc<dyn ChatTransport>,
    endpoint: String,
}

impl PendingHealth {
    pub async fn run(self) -> Result<(), TransportError> {
        self.transport.health(&self.endpoint).await
    }
}

pub struct Session<S, F> {
    config: ConfigStore<S>,
    transcript: Transcript,
    status: StatusIndicator,
    transport: Arc<dyn ChatTransport>,
    feedback: F,
    in_flight: usize,
    pub input: TextField,
    pub config_dialog: ConfigDialog,
    pub emergency_dialog: EmergencyDialog,
}

impl<S: KeyValueStore, F: DeviceFeedback> Session<S, F> {
    pub fn new(store: S, transport: Arc<dyn ChatTransport>, feedback: F) -> Self {
        Self {
            config: ConfigStore::load(store),
            transcript: Transcript::new(),
            status: StatusIndicator::default(),
            transport,
            feedback,
            in_flight: 0,
            input: TextField::default(),
            config_dialog: ConfigDialog::default(),
            emergency_dialog: EmergencyDialog::default(),
        }
    }

    /// Initial status; opens the configuration dialog when no API URL is set.
    pub fn start(&mut self) {
        if self.config.current().has_api_url() {
            self.status.set(STATUS_READY, StatusKind::Success);
        } else {
            warn!("API URL not configured");
            self.status.set(STATUS_CONFIG_REQUIRED, StatusKind::Warning);
            self.config_dialog.open(self.config.current());
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.config.current()
    }

    pub fn config_store(&self) -> &ConfigStore<S> {
        &self.config
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    fn request_started(&mut self) {
        self.in_flight += 1;
        self.transcript.show_loading();
    }

    fn request_finished(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.transcript.hide_loading();
        }
    }

    // ---- chat ----

    pub fn begin_send(&mut self, text: &str) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        if self.is_pending() {
            return SendOutcome::Busy;
        }

        if !self.config.current().has_api_url() {
            self.status.set(STATUS_CONFIG_REQUIRED, StatusKind::Warning);
            self.config_dialog
                .open_with_notice(self.config.current(), CONFIG_MISSING_NOTICE);
            return SendOutcome::ConfigMissing;
        }

        self.transcript.push(Message::user(message));
        self.status.set(STATUS_LOADING, StatusKind::Loading);
        self.request_started();

        SendOutcome::Sent(self.pending_chat(message.to_string()))
    }

    /// Send whatever is in the input box. The box is cleared once the message
    /// is on its way.
    pub fn submit_input(&mut self) -> SendOutcome {
        let text = self.input.value().to_string();
        let outcome = self.begin_send(&text);
        if outcome.is_sent() {
            self.input.clear();
        }
        outcome
    }

    /// Send a canned prompt. A draft in the input box is kept if the prompt
    /// cannot go out yet.
    pub fn quick_action(&mut self, action: QuickAction) -> SendOutcome {
        if self.is_pending() {
            return SendOutcome::Busy;
        }
        self.input.set(action.message());
        self.submit_input()
    }

    pub fn finish_chat(&mut self, result: Result<ChatResponse, TransportError>) {
        self.request_finished();

        match result {
            Ok(reply) => {
                debug!(intent = ?reply.intent, agent = ?reply.agent_used, "chat reply received");
                self.transcript.push(Message::assistant(reply.response));
                self.status.set(STATUS_READY, StatusKind::Success);
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                self.transcript
                    .push(Message::assistant_error(troubleshooting_message(&e)));
                self.status.set(STATUS_CONNECTION_ERROR, StatusKind::Error);
            }
        }
    }

    /// Returns `true` if a round trip took place.
    pub async fn send_message(&mut self, text: &str) -> bool {
        match self.begin_send(text) {
            SendOutcome::Sent(pending) => {
                let result = pending.run().await;
                self.finish_chat(result);
                true
            }
            _ => false,
        }
    }

    fn pending_chat(&self, message: String) -> PendingChat {
        let config = self.config.current();
        PendingChat {
            transport: Arc::clone(&self.transport),
            endpoint: config.endpoint("chat"),
            request: ChatRequest {
                user_id: config.user_id.clone(),
                message,
            },
        }
    }

    // ---- emergency ----

    /// Start the emergency round trip once the user has confirmed and given a
    /// reason. Returns `None` for a blank reason.
    ///
    /// Unlike chat, an emergency is never refused because another request is
    /// in flight.
    pub fn begin_emergency(&mut self, reason: &str) -> Option<PendingEmergency> {
        let reason = reason.trim();
        if reason.is_empty() {
            return None;
        }

        info!(reason, "emergency triggered");
        self.transcript
            .push(Message::user(format!("🚨 {}{}", EMERGENCY_PREFIX, reason)));
        self.status.set(STATUS_EMERGENCY_ACTIVE, StatusKind::Error);
        self.request_started();

        let chat = self
            .config
            .current()
            .has_api_url()
            .then(|| self.pending_chat(format!("{}{}", EMERGENCY_PREFIX, reason)));
        Some(PendingEmergency { chat })
    }

    pub fn finish_emergency(&mut self, result: Result<ChatResponse, TransportError>) {
        self.request_finished();

        match result {
            Ok(reply) => {
                self.transcript.push(Message::assistant(reply.response));

                if let Err(e) = self.feedback.vibrate(&EMERGENCY_VIBRATION_MS) {
                    debug!(error = %e, "vibration unavailable");
                }
                if let Err(e) = self.feedback.play_alert_tone(EMERGENCY_TONE) {
                    debug!(error = %e, "alert tone unavailable");
                }

                self.status.set(STATUS_EMERGENCY_HANDLED, StatusKind::Success);
            }
            Err(e) => {
                warn!(error = %e, "emergency request failed, showing local fallback");
                self.transcript.push(Message::assistant(EMERGENCY_FALLBACK));
                self.status.set(STATUS_EMERGENCY_FAILED, StatusKind::Error);
            }
        }
    }

    /// The full emergency flow: confirm, ask for a reason, send, react.
    /// Returns `false` if the user backed out before anything was sent.
    pub async fn trigger_emergency<P: UserPrompt>(&mut self, prompt: &mut P) -> bool {
        if !prompt.confirm(EMERGENCY_CONFIRM_PROMPT) {
            return false;
        }

        let Some(reason) = prompt.prompt(EMERGENCY_REASON_PROMPT, DEFAULT_EMERGENCY_REASON) else {
            return false;
        };

        let Some(pending) = self.begin_emergency(&reason) else {
            return false;
        };

        let result = pending.run().await;
        self.finish_emergency(result);
        true
    }

    /// Reason submitted from the emergency dialog, if any.
    pub fn submit_emergency_dialog(&mut self) -> Option<PendingEmergency> {
        let reason = self.emergency_dialog.submit()?;
        self.begin_emergency(&reason)
    }

    // ---- configuration ----

    pub fn open_config(&mut self) {
        self.config_dialog.open(self.config.current());
    }

    pub fn cancel_config(&mut self) {
        self.config_dialog.cancel();
    }

    /// Save the dialog contents. On success the dialog closes and a
    /// confirmation is appended to the transcript.
    pub fn save_config(&mut self) -> Result<(), ConfigError> {
        match self.config_dialog.save(&mut self.config) {
            Ok(config) => {
                self.transcript.push(Message::assistant(config_saved_message(&config)));
                self.status.set(STATUS_READY, StatusKind::Success);
                Ok(())
            }
            Err(ConfigError::Store(e)) => {
                warn!(error = %e, "failed to persist configuration");
                self.config_dialog.notice = Some(format!("⚠️ {}", e));
                self.status.set(STATUS_SAVE_FAILED, StatusKind::Error);
                Err(ConfigError::Store(e))
            }
            Err(e) => Err(e),
        }
    }

    // ---- connection check ----

    pub fn begin_health(&mut self) -> Option<PendingHealth> {
        let config = self.config.current();
        if !config.has_api_url() {
            self.status.set(STATUS_CONFIG_REQUIRED, StatusKind::Warning);
            return None;
        }
        self.status.set(STATUS_LOADING, StatusKind::Loading);
        Some(PendingHealth {
            transport: Arc::clone(&self.transport),
            endpoint: config.endpoint("health"),
        })
    }

    pub fn finish_health(&mut self, result: Result<(), TransportError>) {
        match result {
            Ok(()) => self.status.set(STATUS_READY, StatusKind::Success),
            Err(e) => {
                warn!(error = %e, "health check failed");
                self.status.set(STATUS_UNREACHABLE, StatusKind::Warning);
            }
        }
    }

    pub async fn check_connection(&mut self) {
        if let Some(pending) = self.begin_health() {
            let result = pending.run().await;
            self.finish_health(result);
        }
    }
}
