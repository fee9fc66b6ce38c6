use crate::models::application::ApplicationRecord;
use crate::models::plan::PlanId;
use crate::models::provenance::{PROVENANCE_KEY, PROVENANCE_MARKER};
use crate::models::user::UserRecord;

use super::params::ApiParams;

fn tagged() -> ApiParams {
    ApiParams::new().with(PROVENANCE_KEY, PROVENANCE_MARKER)
}

fn user_params(user: &UserRecord) -> ApiParams {
    ApiParams::new()
        .with("username", user.username.as_str())
        .with("email", user.email.as_str())
        .with("password", user.password.as_str())
        .with("name", user.name.as_str())
}

pub fn signup_params(admin: &UserRecord, org_name: &str) -> ApiParams {
    let mut params = user_params(admin).with("org_name", org_name);
    params.extend(tagged());
    params
}

pub fn application_params(application: &ApplicationRecord, plan_id: &PlanId) -> ApiParams {
    let mut params = ApiParams::new()
        .with("name", application.name.as_str())
        .with("description", application.description.as_str())
        .with("plan_id", plan_id.as_ref());
    params.extend(tagged());
    params
}

pub fn member_params(user: &UserRecord) -> ApiParams {
    let mut params = user_params(user);
    params.extend(tagged());
    params
}

/// Values past `i64::MAX` saturate.
pub fn page_params(page: u64, per_page: u64) -> ApiParams {
    ApiParams::new()
        .with("page", i64::try_from(page).unwrap_or(i64::MAX))
        .with("per_page", i64::try_from(per_page).unwrap_or(i64::MAX))
}
