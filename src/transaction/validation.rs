/// Validation logic for transactions separated from type definitions
use crate::error::LedgerError;
use crate::transaction::types::Transaction;

impl Transaction {
    /// Stateless validation: every field must be non-blank and within
    /// `MAX_FIELD_LENGTH`. Caller identity is not checked.
    pub fn validate(&self) -> Result<(), LedgerError> {
        for (name, value) in self.text_fields() {
            if value.trim().is_empty() {
                return Err(LedgerError::InvalidTransaction(format!(
                    "{} cannot be empty",
                    name
                )));
            }
            if value.len() > Self::MAX_FIELD_LENGTH {
                return Err(LedgerError::InvalidTransaction(format!(
                    "{} exceeds maximum length of {} bytes",
                    name,
                    Self::MAX_FIELD_LENGTH
                )));
            }
        }
        Ok(())
    }
}
