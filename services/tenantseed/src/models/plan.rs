use serde::Deserialize;

use crate::models::ids::opaque_id;

opaque_id!(PlanId);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PlanEnvelope {
    pub application_plan: Plan,
}

#[derive(Debug, Deserialize)]
pub struct PlanList {
    #[serde(default)]
    pub plans: Vec<PlanEnvelope>,
}
