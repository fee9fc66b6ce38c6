use std::sync::Arc;

use futures::future::join_all;

use component_store::prelude::*;

use crate::components::admin_client::AdminClient;
use crate::components::fake_data::FakeData;
use crate::components::plan_catalog::{CatalogError, PlanCatalog};
use crate::components::user_activator::UserActivator;
use crate::models::account::AccountId;
use crate::models::plan::PlanId;
use crate::models::summary::RunSummary;

///
/// Fills an approved account with applications and users.
///
pub struct ResourcePopulator {
    client: Arc<AdminClient>,
    catalog: Arc<PlanCatalog>,
    fake_data: Arc<FakeData>,
    activator: Arc<UserActivator>,
    applications: usize,
    users: usize,
}

impl InitComponent for ResourcePopulator {
    fn init(
        resolver: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<Self, ComponentError>> {
        Box::pin(async move {
            let applications = config.get_u64_or("applications", 0)? as usize;
            let users = config.get_u64_or("users", 0)? as usize;

            let client = resolver.resolve::<AdminClient>().await?;
            let catalog = resolver.resolve::<PlanCatalog>().await?;
            let fake_data = resolver.resolve::<FakeData>().await?;
            let activator = resolver.resolve::<UserActivator>().await?;

            Ok(ResourcePopulator {
                client,
                catalog,
                fake_data,
                activator,
                applications,
                users,
            })
        })
    }
}

impl ShutdownComponent for ResourcePopulator {}

impl ComponentName for ResourcePopulator {
    fn component_name() -> &'static str {
        "resource-populator"
    }
}

impl Component for ResourcePopulator {}

impl ResourcePopulator {
    pub fn new(
        client: Arc<AdminClient>,
        catalog: Arc<PlanCatalog>,
        fake_data: Arc<FakeData>,
        activator: Arc<UserActivator>,
        applications: usize,
        users: usize,
    ) -> Self {
        Self {
            client,
            catalog,
            fake_data,
            activator,
            applications,
            users,
        }
    }

    ///
    /// Applications need a plan; fails when some are requested and the
    /// catalog has none.
    ///
    pub fn ensure_plans(&self) -> Result<(), CatalogError> {
        if self.applications > 0 && self.catalog.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        Ok(())
    }

    pub async fn populate(&self, account_id: &AccountId) -> RunSummary {
        self.populate_with(account_id, self.applications, self.users)
            .await
    }

    pub async fn populate_with(
        &self,
        account_id: &AccountId,
        applications: usize,
        users: usize,
    ) -> RunSummary {
        let applications = join_all((0..applications).map(|_| self.create_application(account_id)));
        let users = join_all((0..users).map(|_| self.create_user(account_id)));

        let (applications, users) = futures::join!(applications, users);

        applications.into_iter().chain(users).collect()
    }

    fn pick_plan(&self) -> Result<PlanId, CatalogError> {
        let mut rng = rand::thread_rng();
        self.catalog.pick(&mut rng).map(|plan| plan.id.clone())
    }

    async fn create_application(&self, account_id: &AccountId) -> RunSummary {
        let mut summary = RunSummary::default();
        let record = self.fake_data.application();

        let plan_id = match self.pick_plan() {
            Ok(plan_id) => plan_id,
            Err(err) => {
                tracing::warn!("Cannot create application for account {}: {}", account_id, err);
                summary.applications.failure();
                return summary;
            }
        };

        match self
            .client
            .create_application(account_id, &record, &plan_id)
            .await
        {
            Ok(application) => {
                tracing::info!(
                    "Just created a 'application' with id = {} and name = {}",
                    application.id,
                    application.display_name()
                );
                tracing::debug!(
                    "Application {} is bound to plan {}",
                    application.id,
                    application.plan_id.as_ref().unwrap_or(&plan_id)
                );
                summary.applications.success();
            }
            Err(err) => {
                tracing::warn!("Failed to create application for account {}: {}", account_id, err);
                summary.applications.failure();
            }
        }

        summary
    }

    async fn create_user(&self, account_id: &AccountId) -> RunSummary {
        let mut summary = RunSummary::default();
        let record = self.fake_data.user();

        let user = match self.client.create_user(account_id, &record).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!("Failed to create user for account {}: {}", account_id, err);
                summary.users.failure();
                return summary;
            }
        };

        tracing::info!(
            "Just created a 'user' with id = {} and name = {}",
            user.id,
            user.display_name()
        );
        if let Some(email) = &user.email {
            tracing::debug!("User {} reachable at {}", user.id, email);
        }
        summary.users.success();

        summary.merge(&self.activator.activate_if_pending(&user, account_id).await);
        summary
    }
}

#[cfg(test)]
mod tests {
    use inflight_limiter::InFlightLimiter;
    use reqwest::Method;

    use super::*;
    use crate::components::admin_client::ParamValue;
    use crate::models::user::UserState;
    use crate::testing::FakeAdminApi;

    async fn populator(api: &Arc<FakeAdminApi>, applications: usize, users: usize) -> ResourcePopulator {
        api.add_account(5);

        let client = Arc::new(AdminClient::new(api.clone(), InFlightLimiter::unbounded()));
        let catalog = Arc::new(PlanCatalog::fetch_plans(&client).await.unwrap());
        let fake_data = Arc::new(FakeData::new(Some(9), "example.test".into()));
        let activator = Arc::new(UserActivator::new(client.clone()));

        ResourcePopulator::new(client, catalog, fake_data, activator, applications, users)
    }

    #[tokio::test]
    async fn test_populates_account() {
        let api = Arc::new(FakeAdminApi::with_plans(&["Basic", "Pro"]));
        api.set_user_state(UserState::Pending);
        let populator = populator(&api, 3, 2).await;

        let summary = populator.populate(&AccountId("5".into())).await;

        assert_eq!(summary.applications.succeeded, 3);
        assert_eq!(summary.users.succeeded, 2);
        assert_eq!(summary.activations.succeeded, 2);
        assert_eq!(
            api.calls_to(&Method::POST, "/admin/api/accounts/5/applications.json"),
            3
        );

        let plan_ids = api.plan_ids();
        for call in api.calls_matching(&Method::POST, "/admin/api/accounts/5/applications.json") {
            match call.params.get("plan_id") {
                Some(ParamValue::Text(id)) => assert!(plan_ids.contains(id)),
                other => panic!("unexpected plan_id: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_blocks_applications() {
        let api = Arc::new(FakeAdminApi::with_plans(&[]));
        let populator = populator(&api, 2, 0).await;

        assert_eq!(populator.ensure_plans(), Err(CatalogError::EmptyCatalog));

        let summary = populator.populate(&AccountId("5".into())).await;

        assert_eq!(summary.applications.failed, 2);
        assert_eq!(
            api.calls_to(&Method::POST, "/admin/api/accounts/5/applications.json"),
            0
        );
    }

    #[tokio::test]
    async fn test_empty_catalog_without_applications() {
        let api = Arc::new(FakeAdminApi::with_plans(&[]));
        let populator = populator(&api, 0, 1).await;

        assert!(populator.ensure_plans().is_ok());
        assert_eq!(populator.populate(&AccountId("5".into())).await.users.succeeded, 1);
    }

    #[tokio::test]
    async fn test_user_failure_does_not_stop_siblings() {
        let api = Arc::new(FakeAdminApi::with_plans(&["Basic"]));
        api.fail_path("/admin/api/accounts/5/users.json");
        let populator = populator(&api, 2, 2).await;

        let summary = populator.populate(&AccountId("5".into())).await;

        assert_eq!(summary.users.failed, 2);
        assert_eq!(summary.applications.succeeded, 2);
        assert_eq!(summary.activations.total(), 0);
    }

    #[tokio::test]
    async fn test_unknown_account_fails_every_pipeline() {
        let api = Arc::new(FakeAdminApi::with_plans(&["Basic"]));
        let populator = populator(&api, 1, 1).await;

        let summary = populator.populate(&AccountId("6".into())).await;

        assert_eq!(summary.applications.failed, 1);
        assert_eq!(summary.users.failed, 1);
        assert_eq!(summary.activations.total(), 0);
    }
}
