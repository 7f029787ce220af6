//! Modal dialog state machines: configuration editing and emergency confirmation.

use crate::config::{ClientConfig, ConfigStore};
use crate::error::{ConfigError, ValidationError};
use crate::store::KeyValueStore;

pub const DEFAULT_EMERGENCY_REASON: &str = "J'ai besoin d'aide urgente";

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line editable text with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: &str) {
        *self = Self::new(value);
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigField {
    #[default]
    ApiUrl,
    UserId,
}

#[derive(Debug, Default)]
pub struct ConfigDialog {
    open: bool,
    pub api_url: TextField,
    pub user_id: TextField,
    pub focus: ConfigField,
    /// Shown above the fields, e.g. why the dialog was opened.
    pub notice: Option<String>,
    /// Inline validation message from the last save attempt.
    pub error: Option<ValidationError>,
}

impl ConfigDialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self, config: &ClientConfig) {
        self.api_url.set(&config.api_base_url);
        self.user_id.set(&config.user_id);
        self.focus = ConfigField::ApiUrl;
        self.notice = None;
        self.error = None;
        self.open = true;
    }

    pub fn open_with_notice(&mut self, config: &ClientConfig, notice: impl Into<String>) {
        self.open(config);
        self.notice = Some(notice.into());
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    /// Validate and persist. Closes only on success.
    pub fn save<S: KeyValueStore>(&mut self, store: &mut ConfigStore<S>) -> Result<ClientConfig, ConfigError> {
        match store.save(self.api_url.value(), self.user_id.value()) {
            Ok(config) => {
                self.close();
                Ok(config)
            }
            Err(ConfigError::Validation(e)) => {
                self.error = Some(e.clone());
                Err(ConfigError::Validation(e))
            }
            Err(e) => Err(e),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ConfigField::ApiUrl => ConfigField::UserId,
            ConfigField::UserId => ConfigField::ApiUrl,
        };
    }

    pub fn focused_field(&mut self) -> &mut TextField {
        match self.focus {
            ConfigField::ApiUrl => &mut self.api_url,
            ConfigField::UserId => &mut self.user_id,
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.notice = None;
        self.error = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmergencyStep {
    #[default]
    Closed,
    Confirming,
    EnteringReason,
}

/// Confirm, then ask for a reason. Either step can abort.
#[derive(Debug, Default)]
pub struct EmergencyDialog {
    step: EmergencyStep,
    pub reason: TextField,
}

impl EmergencyDialog {
    pub fn step(&self) -> EmergencyStep {
        self.step
    }

    pub fn is_open(&self) -> bool {
        self.step != EmergencyStep::Closed
    }

    pub fn open(&mut self) {
        self.step = EmergencyStep::Confirming;
    }

    pub fn confirm(&mut self) {
        if self.step == EmergencyStep::Confirming {
            self.reason.set(DEFAULT_EMERGENCY_REASON);
            self.step = EmergencyStep::EnteringReason;
        }
    }

    pub fn decline(&mut self) {
        self.step = EmergencyStep::Closed;
    }

    pub fn cancel(&mut self) {
        self.reason.clear();
        self.step = EmergencyStep::Closed;
    }

    /// Close the dialog and hand back the reason, or `None` if it was left blank.
    pub fn submit(&mut self) -> Option<String> {
        if self.step != EmergencyStep::EnteringReason {
            return None;
        }
        self.step = EmergencyStep::Closed;
        let reason = self.reason.take();
        let reason = reason.trim();
        if reason.is_empty() {
            None
        } else {
            Some(reason.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{API_URL_KEY, USER_ID_KEY};
    use crate::store::MemoryStore;

    #[test]
    fn test_text_field_utf8_editing() {
        let mut field = TextField::new("été");
        field.left();
        field.backspace();
        assert_eq!(field.value(), "éé");
        field.home();
        field.insert('L');
        assert_eq!(field.value(), "Léé");
        field.end();
        field.delete();
        assert_eq!(field.value(), "Léé");
        assert_eq!(field.cursor(), 3);
    }

    #[test]
    fn test_config_dialog_open_populates_fields() {
        let mut dialog = ConfigDialog::default();
        let config = ClientConfig {
            api_base_url: "https://api.example.com".to_string(),
            user_id: "bob".to_string(),
        };
        dialog.open(&config);
        assert!(dialog.is_open());
        assert_eq!(dialog.api_url.value(), "https://api.example.com");
        assert_eq!(dialog.user_id.value(), "bob");
        assert_eq!(dialog.focus, ConfigField::ApiUrl);
    }

    #[test]
    fn test_config_dialog_cancel_does_not_persist() {
        let store = ConfigStore::load(MemoryStore::new());
        let mut dialog = ConfigDialog::default();
        dialog.open(store.current());
        dialog.api_url.set("https://api.example.com");
        dialog.cancel();

        assert!(!dialog.is_open());
        assert_eq!(store.store().get(API_URL_KEY), None);
        // Re-opening shows the persisted value, not the discarded edit.
        dialog.open(store.current());
        assert_eq!(dialog.api_url.value(), "");
    }

    #[test]
    fn test_config_dialog_invalid_save_stays_open() {
        let mut store = ConfigStore::load(MemoryStore::new());
        let mut dialog = ConfigDialog::default();
        dialog.open(store.current());
        dialog.api_url.set("not a url");

        assert!(dialog.save(&mut store).is_err());
        assert!(dialog.is_open());
        assert!(matches!(dialog.error, Some(ValidationError::InvalidApiUrl(_))));
        assert_eq!(store.store().get(USER_ID_KEY), None);
    }

    #[test]
    fn test_config_dialog_valid_save_closes() {
        let mut store = ConfigStore::load(MemoryStore::new());
        let mut dialog = ConfigDialog::default();
        dialog.open_with_notice(store.current(), "configure first");
        dialog.api_url.set("https://api.example.com");
        dialog.toggle_focus();
        dialog.focused_field().set("bob");

        let saved = dialog.save(&mut store).unwrap();
        assert!(!dialog.is_open());
        assert!(dialog.notice.is_none());
        assert_eq!(saved.user_id, "bob");
        assert_eq!(store.store().get(USER_ID_KEY).as_deref(), Some("bob"));
    }

    #[test]
    fn test_emergency_dialog_decline() {
        let mut dialog = EmergencyDialog::default();
        dialog.open();
        dialog.decline();
        assert!(!dialog.is_open());
        assert_eq!(dialog.submit(), None);
    }

    #[test]
    fn test_emergency_dialog_prefills_default_reason() {
        let mut dialog = EmergencyDialog::default();
        dialog.open();
        dialog.confirm();
        assert_eq!(dialog.step(), EmergencyStep::EnteringReason);
        assert_eq!(dialog.reason.value(), DEFAULT_EMERGENCY_REASON);
        assert_eq!(dialog.submit().as_deref(), Some(DEFAULT_EMERGENCY_REASON));
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_emergency_dialog_blank_reason_aborts() {
        let mut dialog = EmergencyDialog::default();
        dialog.open();
        dialog.confirm();
        dialog.reason.set("   ");
        assert_eq!(dialog.submit(), None);
        assert!(!dialog.is_open());
    }
}
