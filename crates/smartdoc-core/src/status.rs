#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Loading,
    Warning,
}

impl StatusKind {
    /// Hex color of the status dot.
    pub fn color(&self) -> &'static str {
        match self {
            StatusKind::Success => "#48bb78",
            StatusKind::Error => "#f56565",
            StatusKind::Loading => "#ed8936",
            StatusKind::Warning => "#ecc94b",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            StatusKind::Success => (0x48, 0xbb, 0x78),
            StatusKind::Error => (0xf5, 0x65, 0x65),
            StatusKind::Loading => (0xed, 0x89, 0x36),
            StatusKind::Warning => (0xec, 0xc9, 0x4b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusState {
    pub label: String,
    pub kind: StatusKind,
}

/// Last write wins; no history is kept.
#[derive(Debug, Clone)]
pub struct StatusIndicator {
    current: StatusState,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self {
            current: StatusState {
                label: "Prêt".to_string(),
                kind: StatusKind::Success,
            },
        }
    }
}

impl StatusIndicator {
    pub fn set(&mut self, label: impl Into<String>, kind: StatusKind) {
        self.current = StatusState {
            label: label.into(),
            kind,
        };
    }

    pub fn current(&self) -> &StatusState {
        &self.current
    }

    pub fn kind(&self) -> StatusKind {
        self.current.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut status = StatusIndicator::default();
        status.set("Traitement...", StatusKind::Loading);
        status.set("Erreur de connexion", StatusKind::Error);
        assert_eq!(status.current().label, "Erreur de connexion");
        assert_eq!(status.kind(), StatusKind::Error);
    }

    #[test]
    fn test_colors_match_hex() {
        for kind in [
            StatusKind::Success,
            StatusKind::Error,
            StatusKind::Loading,
            StatusKind::Warning,
        ] {
            let (r, g, b) = kind.rgb();
            assert_eq!(kind.color(), format!("#{:02x}{:02x}{:02x}", r, g, b));
        }
    }
}
