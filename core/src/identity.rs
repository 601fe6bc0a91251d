use serde::{Deserialize, Serialize};

/// The player's display name, persisted across sessions and attached to
/// completion reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    name: String,
}

impl PlayerIdentity {
    /// Accepts a raw submission, trimming surrounding whitespace. Empty or
    /// whitespace-only input yields `None`; the prompt stays up and the
    /// player resubmits.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
