pub mod api;
pub mod config;
pub mod dialog;
pub mod error;
pub mod feedback;
pub mod quick_action;
pub mod session;
pub mod state;
pub mod status;
pub mod store;

// Re-export main types for convenience
pub use api::{ChatRequest, ChatResponse, ChatTransport, HttpTransport};
pub use config::{ClientConfig, ConfigStore};
pub use dialog::{ConfigDialog, ConfigField, EmergencyDialog, EmergencyStep, TextField};
pub use error::{ConfigError, FeedbackError, StoreError, TransportError, ValidationError};
pub use feedback::{AlertTone, DeviceFeedback, NoopFeedback};
pub use quick_action::QuickAction;
pub use session::{PendingChat, PendingEmergency, PendingHealth, SendOutcome, Session, UserPrompt};
pub use state::{Message, Sender, Transcript};
pub use status::{StatusIndicator, StatusKind, StatusState};
pub use store::{FileStore, KeyValueStore, MemoryStore};
