use serde::{Deserialize, Serialize};

use crate::models::ids::opaque_id;
use crate::models::lifecycle::TransitionError;
use crate::models::provenance::PROVENANCE_MARKER;

opaque_id!(AccountId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    Created,
    Pending,
    Approved,
    Rejected,
    Suspended,
    #[serde(other)]
    Unknown,
}

impl Default for AccountState {
    fn default() -> Self {
        AccountState::Unknown
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub state: AccountState,
    #[serde(rename = "x-created-by", default)]
    pub created_by: Option<String>,
}

impl Account {
    pub fn is_script_created(&self) -> bool {
        self.created_by.as_deref() == Some(PROVENANCE_MARKER)
    }

    pub fn display_name(&self) -> &str {
        self.org_name.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Deserialize)]
pub struct AccountEnvelope {
    pub account: Account,
}

#[derive(Debug, Deserialize)]
pub struct AccountList {
    #[serde(default)]
    pub accounts: Vec<AccountEnvelope>,
}

///
/// Where a single account pipeline currently is.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountPhase {
    SignupSent,
    Approving,
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    SignedUp(AccountState),
    ApproveSucceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    Approve,
    Populate,
}

impl AccountPhase {
    pub fn on(self, event: AccountEvent) -> Result<(AccountPhase, AccountAction), TransitionError> {
        match (self, event) {
            (AccountPhase::SignupSent, AccountEvent::SignedUp(AccountState::Created)) => {
                Ok((AccountPhase::Approving, AccountAction::Approve))
            }
            (AccountPhase::SignupSent, AccountEvent::SignedUp(_)) => {
                Ok((AccountPhase::Approved, AccountAction::Populate))
            }
            (AccountPhase::Approving, AccountEvent::ApproveSucceeded) => {
                Ok((AccountPhase::Approved, AccountAction::Populate))
            }
            (phase, event) => Err(TransitionError::new("account", phase, event)),
        }
    }
}
