use serde::{Deserialize, Serialize};

/// Where the premium unlock stands for the stored session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// No unlock requested.
    #[default]
    None,
    /// Redirect to the payment origin was initiated but not yet confirmed.
    Pending,
    /// Return from the payment origin was observed.
    Confirmed,
}

/// The durable client session: everything that must survive the full-page
/// navigation to the external payment origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub transcript: Option<String>,
    #[serde(default)]
    pub payment: PaymentState,
}

impl SessionRecord {
    pub fn is_empty(&self) -> bool {
        self.transcript.is_none() && self.payment == PaymentState::None
    }
}
