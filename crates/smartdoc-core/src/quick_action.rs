/// Canned prompts offered as one-key shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Medications,
    Appointments,
    Symptoms,
    Help,
}

impl QuickAction {
    pub fn all() -> Vec<QuickAction> {
        vec![
            QuickAction::Medications,
            QuickAction::Appointments,
            QuickAction::Symptoms,
            QuickAction::Help,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QuickAction::Medications => "💊 Médicaments",
            QuickAction::Appointments => "📅 Rendez-vous",
            QuickAction::Symptoms => "🌡️ Symptômes",
            QuickAction::Help => "❓ Aide",
        }
    }

    /// The message sent on the user's behalf.
    pub fn message(&self) -> &'static str {
        match self {
            QuickAction::Medications => "Quels sont mes médicaments à prendre aujourd'hui?",
            QuickAction::Appointments => "Quand est mon prochain rendez-vous?",
            QuickAction::Symptoms => {
                "Je ne me sens pas très bien, j'aimerais vous décrire mes symptômes."
            }
            QuickAction::Help => "Peux-tu m'expliquer comment tu peux m'aider?",
        }
    }
}
