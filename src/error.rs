use crate::entity::{ItemType, OperationKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeakFormError {
    #[error("{kind} is not implemented for item type {item_type}")]
    Unsupported {
        kind: OperationKind,
        item_type: ItemType,
    },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PeakFormError {
    /// True when the failure was decided client-side, before any request was
    /// sent over the transport.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, PeakFormError::Unsupported { .. })
    }
}
