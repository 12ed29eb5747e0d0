/// Transaction types for MediLedger
use crate::blockchain::core::canonical;
use crate::clock::Timestamp;
use serde::{Deserialize, Serialize};

/// A single hand-off event: `sender` passes `subject_id` to `recipient`,
/// recording the item's new `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub subject_id: String,
    pub status: String,
    pub created_at: Timestamp,
}

impl Transaction {
    /// Maximum length of any single field, in bytes
    pub const MAX_FIELD_LENGTH: usize = 256;

    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        subject_id: impl Into<String>,
        status: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            subject_id: subject_id.into(),
            status: status.into(),
            created_at,
        }
    }

    /// SHA-256 over the transaction's canonical encoding.
    pub fn hash(&self) -> [u8; 32] {
        canonical::digest(&canonical::transaction_value(self))
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }

    /// Fields as `(name, value)` pairs, in declaration order.
    pub(crate) fn text_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("sender", self.sender.as_str()),
            ("recipient", self.recipient.as_str()),
            ("subject_id", self.subject_id.as_str()),
            ("status", self.status.as_str()),
        ]
    }
}
