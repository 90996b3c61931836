//! Party entity
//!
//! A party is any person or organization that can hold or pay for a
//! contract.

use std::collections::BTreeMap;

use core_kernel::{EntityBase, Ordinal};
use serde::{Deserialize, Serialize};

/// Legal structure of a party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    /// A single natural person
    #[default]
    Individual,
    /// A single legal entity (company, LLC, etc.)
    Corporate,
    /// Multiple individuals sharing ownership
    Joint,
    /// A trust managed by trustees
    Trust,
    /// A business partnership
    Partnership,
}

impl Ordinal for PartyKind {
    fn ordinal(self) -> i64 {
        match self {
            PartyKind::Individual => 0,
            PartyKind::Corporate => 1,
            PartyKind::Joint => 2,
            PartyKind::Trust => 3,
            PartyKind::Partnership => 4,
        }
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(PartyKind::Individual),
            1 => Some(PartyKind::Corporate),
            2 => Some(PartyKind::Joint),
            3 => Some(PartyKind::Trust),
            4 => Some(PartyKind::Partnership),
            _ => None,
        }
    }
}

/// A customer, organization or other contract participant
///
/// Base timestamps are stored at millisecond precision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Party {
    #[serde(flatten)]
    pub base: EntityBase,
    pub display_name: String,
    pub kind: PartyKind,
    pub email: Option<String>,
    /// Whether identity verification has completed
    pub verified: bool,
    /// Underwriting risk score, 0.0 (lowest) upward; must be finite
    pub risk_score: f64,
    pub attributes: BTreeMap<String, String>,
}

impl Party {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: PartyKind) -> Self {
        Self {
            base: EntityBase::with_id(id),
            display_name: display_name.into(),
            kind,
            email: None,
            verified: false,
            risk_score: 0.0,
            attributes: BTreeMap::new(),
        }
    }

    pub fn individual(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, PartyKind::Individual)
    }

    pub fn corporate(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, PartyKind::Corporate)
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Marks identity verification as complete
    pub fn verify(&mut self) {
        self.verified = true;
        self.base.touch();
    }
}
