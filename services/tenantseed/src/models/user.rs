use serde::{Deserialize, Serialize};

use crate::models::ids::opaque_id;
use crate::models::lifecycle::TransitionError;

opaque_id!(UserId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Pending,
    Active,
    Suspended,
    #[serde(other)]
    Unknown,
}

impl Default for UserState {
    fn default() -> Self {
        UserState::Unknown
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub state: UserState,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// Synthetic user sent on signup (as the admin) and on member creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPhase {
    Created,
    Activating,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    Reported(UserState),
    Activated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Activate,
    Finish,
}

impl UserPhase {
    pub fn on(self, event: UserEvent) -> Result<(UserPhase, UserAction), TransitionError> {
        match (self, event) {
            (UserPhase::Created, UserEvent::Reported(UserState::Pending)) => {
                Ok((UserPhase::Activating, UserAction::Activate))
            }
            (UserPhase::Created, UserEvent::Reported(_)) => Ok((UserPhase::Done, UserAction::Finish)),
            (UserPhase::Activating, UserEvent::Activated) => Ok((UserPhase::Done, UserAction::Finish)),
            (phase, event) => Err(TransitionError::new("user", phase, event)),
        }
    }
}
