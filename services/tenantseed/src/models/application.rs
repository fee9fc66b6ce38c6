use serde::Deserialize;

use crate::models::ids::opaque_id;
use crate::models::plan::PlanId;

opaque_id!(ApplicationId);

#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plan_id: Option<PlanId>,
}

impl Application {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationEnvelope {
    pub application: Application,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub name: String,
    pub description: String,
}
