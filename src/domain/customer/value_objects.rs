use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::AccountNumber;

// ============================================================================
// Customer Value Objects
// ============================================================================

/// Customer email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(pub String);

impl Email {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredential {
    pub id: Uuid,
    pub user_name: String,
}

/// A customer as seen by the order service. Never mutated by a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub email: Email,
    pub address: String,
    pub bank_account_number: AccountNumber,
    pub login_credential: LoginCredential,
}
