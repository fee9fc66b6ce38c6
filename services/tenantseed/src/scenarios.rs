//! Whole-run scenarios against the in-memory admin API.

use std::collections::HashSet;
use std::sync::Arc;

use inflight_limiter::InFlightLimiter;
use reqwest::Method;

use crate::components::admin_client::{AdminClient, ParamValue};
use crate::components::{
    AccountProvisioner, CatalogError, CleanupScanner, FakeData, PlanCatalog, ResourcePopulator,
    UserActivator,
};
use crate::models::account::AccountState;
use crate::models::provenance::{PROVENANCE_KEY, PROVENANCE_MARKER};
use crate::models::user::UserState;
use crate::testing::FakeAdminApi;

struct Run {
    api: Arc<FakeAdminApi>,
    client: Arc<AdminClient>,
}

impl Run {
    fn new(api: FakeAdminApi, max_in_flight: Option<usize>) -> Self {
        let api = Arc::new(api);
        let client = Arc::new(AdminClient::new(
            api.clone(),
            InFlightLimiter::new(max_in_flight),
        ));

        Self { api, client }
    }

    async fn provisioner(&self, applications: usize, users: usize) -> AccountProvisioner {
        let catalog = Arc::new(PlanCatalog::fetch_plans(&self.client).await.unwrap());
        let fake_data = Arc::new(FakeData::new(None, "example.test".into()));
        let activator = Arc::new(UserActivator::new(self.client.clone()));
        let populator = Arc::new(ResourcePopulator::new(
            self.client.clone(),
            catalog,
            fake_data.clone(),
            activator,
            applications,
            users,
        ));

        AccountProvisioner::new(self.client.clone(), fake_data, populator, 0)
    }

    fn scanner(&self) -> CleanupScanner {
        CleanupScanner::new(self.client.clone(), None)
    }
}

fn is_tagged(params: &crate::components::admin_client::ApiParams) -> bool {
    params.get(PROVENANCE_KEY) == Some(&ParamValue::Text(PROVENANCE_MARKER.into()))
}

#[tokio::test]
async fn test_create_two_accounts() {
    let run = Run::new(FakeAdminApi::with_plans(&["planA", "planB"]), None);
    run.api.set_signup_state(AccountState::Created);
    run.api.set_user_state(UserState::Pending);

    let summary = run
        .provisioner(3, 2)
        .await
        .provision_accounts(2)
        .await
        .unwrap();
    let api = &run.api;

    assert_eq!(api.calls_to(&Method::GET, "/admin/api/application_plans.json"), 1);
    assert_eq!(api.calls_to(&Method::POST, "/admin/api/signup.json"), 2);
    assert_eq!(api.calls_with_suffix(&Method::PUT, "/approve.json"), 2);
    assert_eq!(api.calls_with_suffix(&Method::POST, "/applications.json"), 6);
    assert_eq!(api.calls_with_suffix(&Method::POST, "/users.json"), 4);
    assert_eq!(api.calls_with_suffix(&Method::PUT, "/activate.json"), 4);

    assert_eq!(summary.accounts.succeeded, 2);
    assert_eq!(summary.applications.succeeded, 6);
    assert_eq!(summary.activations.succeeded, 4);
    assert_eq!(summary.failures(), 0);

    let plan_ids: HashSet<_> = api.plan_ids().into_iter().collect();
    for call in api.calls() {
        if call.path.ends_with("/applications.json") {
            let plan_id = call.params.get("plan_id").map(|id| id.to_string());
            assert!(plan_id.map_or(false, |id| plan_ids.contains(&id)));
        }
    }
}

#[tokio::test]
async fn test_every_created_payload_is_tagged() {
    let run = Run::new(FakeAdminApi::with_plans(&["planA"]), None);

    run.provisioner(2, 2)
        .await
        .provision_accounts(3)
        .await
        .unwrap();

    let posts: Vec<_> = run
        .api
        .calls()
        .into_iter()
        .filter(|call| call.method == Method::POST)
        .collect();

    assert_eq!(posts.len(), 3 + 3 * 2 + 3 * 2);
    assert!(posts.iter().all(|call| is_tagged(&call.params)));
}

#[tokio::test]
async fn test_approved_signups_and_active_users_need_nothing() {
    let run = Run::new(FakeAdminApi::with_plans(&["planA"]), None);
    run.api.set_signup_state(AccountState::Pending);
    run.api.set_user_state(UserState::Active);

    let summary = run
        .provisioner(1, 2)
        .await
        .provision_accounts(2)
        .await
        .unwrap();

    assert_eq!(run.api.calls_with_suffix(&Method::PUT, "/approve.json"), 0);
    assert_eq!(run.api.calls_with_suffix(&Method::PUT, "/activate.json"), 0);
    assert_eq!(summary.approvals.skipped, 2);
    assert_eq!(summary.activations.skipped, 4);
}

#[tokio::test]
async fn test_empty_catalog_creates_nothing() {
    let run = Run::new(FakeAdminApi::with_plans(&[]), None);

    let res = run.provisioner(1, 1).await.provision_accounts(2).await;

    assert_eq!(res, Err(CatalogError::EmptyCatalog));
    assert_eq!(run.api.calls_to(&Method::POST, "/admin/api/signup.json"), 0);
    assert_eq!(run.api.calls_with_suffix(&Method::POST, "/applications.json"), 0);
}

#[tokio::test]
async fn test_cleanup_deletes_exactly_tagged_accounts() {
    let api = FakeAdminApi::default();
    api.add_accounts(2, false);
    let tagged = api.add_accounts(2, true);
    api.add_accounts(1, false);
    let run = Run::new(api, None);

    let summary = run.scanner().cleanup().await.unwrap();

    let deleted: HashSet<_> = run
        .api
        .calls()
        .into_iter()
        .filter(|call| call.method == Method::DELETE)
        .map(|call| call.path)
        .collect();
    let expected: HashSet<_> = tagged
        .iter()
        .map(|id| format!("/admin/api/accounts/{}.json", id))
        .collect();

    assert_eq!(deleted, expected);
    assert_eq!(summary.deletions.succeeded, 2);
    assert_eq!(summary.untouched, 3);
}

#[tokio::test]
async fn test_create_then_cleanup_twice() {
    let api = FakeAdminApi::with_plans(&["planA"]);
    api.add_accounts(2, false);
    let run = Run::new(api, Some(3));

    run.provisioner(1, 1)
        .await
        .provision_accounts(4)
        .await
        .unwrap();

    let first = run.scanner().cleanup().await.unwrap();
    let second = run.scanner().cleanup().await.unwrap();

    assert_eq!(first.deletions.succeeded, 4);
    assert_eq!(second.deletions.total(), 0);
    assert_eq!(run.api.remaining_accounts(), 2);
    assert!(run.api.peak_in_flight() <= 3);
}
