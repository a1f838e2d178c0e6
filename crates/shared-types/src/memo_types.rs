//! # Memo Type Vocabulary
//!
//! The fixed system vocabulary plus the open set of application memo types.

use serde::{Deserialize, Serialize};

/// System memo types. These are never chunked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemMemoType {
    /// Publishes an ECDH public key to a counterparty.
    Handshake,
    /// Reward paid out for an initiation rite.
    InitiationReward,
    /// A new participant's initiation statement.
    InitiationRite,
    /// Link to a participant's external context document.
    ContextDocLink,
}

impl SystemMemoType {
    /// All system memo types.
    pub const ALL: [SystemMemoType; 4] = [
        SystemMemoType::Handshake,
        SystemMemoType::InitiationReward,
        SystemMemoType::InitiationRite,
        SystemMemoType::ContextDocLink,
    ];

    /// Wire value of the memo type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SystemMemoType::Handshake => "HANDSHAKE",
            SystemMemoType::InitiationReward => "INITIATION_REWARD",
            SystemMemoType::InitiationRite => "INITIATION_RITE",
            SystemMemoType::ContextDocLink => "google_doc_context_link",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// Classified memo type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemoType {
    /// Entry from the system vocabulary.
    System(SystemMemoType),
    /// Application-defined type (task ids, chunked message ids, ...).
    Application(String),
}

impl MemoType {
    /// Classify a raw memo type string.
    ///
    /// Handshakes are sometimes sent with a generated id prefix
    /// (`<id>_HANDSHAKE`); those classify as handshakes too.
    pub fn parse(raw: &str) -> Self {
        if let Some(system) = SystemMemoType::from_wire(raw) {
            return MemoType::System(system);
        }
        if raw.ends_with("_HANDSHAKE") {
            return MemoType::System(SystemMemoType::Handshake);
        }
        MemoType::Application(raw.to_string())
    }

    /// Whether this is a handshake memo.
    pub fn is_handshake(&self) -> bool {
        matches!(self, MemoType::System(SystemMemoType::Handshake))
    }

    /// Whether this is part of the system vocabulary.
    pub fn is_system(&self) -> bool {
        matches!(self, MemoType::System(_))
    }

    /// Wire value.
    pub fn as_str(&self) -> &str {
        match self {
            MemoType::System(system) => system.as_str(),
            MemoType::Application(raw) => raw.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_system_types() {
        for system in SystemMemoType::ALL {
            assert_eq!(MemoType::parse(system.as_str()), MemoType::System(system));
        }
    }

    #[test]
    fn test_prefixed_handshake() {
        assert!(MemoType::parse("2024-08-17_17:57__TO94_HANDSHAKE").is_handshake());
    }

    #[test]
    fn test_application_type() {
        let parsed = MemoType::parse("2024-08-17_17:57__TO94");
        assert!(!parsed.is_system());
        assert_eq!(parsed.as_str(), "2024-08-17_17:57__TO94");
    }
}
