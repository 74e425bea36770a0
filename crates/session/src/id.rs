use std::fmt;

/// Identifies one combat managed by a session.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CombatId(pub String);

impl CombatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombatId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for CombatId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
