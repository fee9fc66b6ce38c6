use std::sync::Arc;

use futures::future::join_all;

use component_store::prelude::*;

use crate::components::admin_client::AdminClient;
use crate::components::fake_data::FakeData;
use crate::components::plan_catalog::CatalogError;
use crate::components::resource_populator::ResourcePopulator;
use crate::models::account::{AccountAction, AccountEvent, AccountPhase};
use crate::models::summary::RunSummary;

pub struct AccountProvisioner {
    client: Arc<AdminClient>,
    fake_data: Arc<FakeData>,
    populator: Arc<ResourcePopulator>,
    accounts: usize,
}

impl InitComponent for AccountProvisioner {
    fn init(
        resolver: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<Self, ComponentError>> {
        Box::pin(async move {
            let accounts = config.get_u64_or("accounts", 0)? as usize;

            let client = resolver.resolve::<AdminClient>().await?;
            let fake_data = resolver.resolve::<FakeData>().await?;
            let populator = resolver.resolve::<ResourcePopulator>().await?;

            Ok(AccountProvisioner::new(client, fake_data, populator, accounts))
        })
    }
}

impl ShutdownComponent for AccountProvisioner {}

impl ComponentName for AccountProvisioner {
    fn component_name() -> &'static str {
        "account-provisioner"
    }
}

impl Component for AccountProvisioner {}

impl AccountProvisioner {
    pub fn new(
        client: Arc<AdminClient>,
        fake_data: Arc<FakeData>,
        populator: Arc<ResourcePopulator>,
        accounts: usize,
    ) -> Self {
        Self {
            client,
            fake_data,
            populator,
            accounts,
        }
    }

    pub async fn run(&self) -> Result<RunSummary, CatalogError> {
        self.provision_accounts(self.accounts).await
    }

    ///
    /// Runs `count` account pipelines side by side. Nothing is sent when
    /// applications are requested and no plan exists.
    ///
    pub async fn provision_accounts(&self, count: usize) -> Result<RunSummary, CatalogError> {
        self.populator.ensure_plans()?;

        tracing::info!("Creating {} accounts...", count);

        let pipelines = (0..count).map(|_| {
            let org_name = self.fake_data.org_name();
            async move { self.provision_account(&org_name).await }
        });

        Ok(join_all(pipelines).await.into_iter().collect())
    }

    ///
    /// Signup, approval when the account comes back `created`, then population.
    /// A failed step ends this pipeline only.
    ///
    pub async fn provision_account(&self, org_name: &str) -> RunSummary {
        let mut summary = RunSummary::default();
        let admin = self.fake_data.user();

        let account = match self.client.signup(&admin, org_name).await {
            Ok(account) => account,
            Err(err) => {
                tracing::warn!("Failed to sign up account '{}': {}", org_name, err);
                summary.accounts.failure();
                return summary;
            }
        };

        tracing::info!(
            "Just created a 'account' with id = {} and name = {}",
            account.id,
            account.display_name()
        );
        summary.accounts.success();

        let mut phase = AccountPhase::SignupSent;
        let mut event = AccountEvent::SignedUp(account.state);

        loop {
            let (next, action) = match phase.on(event) {
                Ok(transition) => transition,
                Err(err) => {
                    tracing::warn!("Account {}: {}", account.id, err);
                    summary.approvals.failure();
                    return summary;
                }
            };

            match action {
                AccountAction::Approve => match self.client.approve_account(&account.id).await {
                    Ok(approved) => {
                        tracing::info!(
                            "Just approved a 'account' with id = {} and name = {}",
                            approved.id,
                            approved.display_name()
                        );
                        summary.approvals.success();
                        event = AccountEvent::ApproveSucceeded;
                    }
                    Err(err) => {
                        tracing::warn!("Failed to approve account {}: {}", account.id, err);
                        summary.approvals.failure();
                        return summary;
                    }
                },
                AccountAction::Populate => {
                    if phase == AccountPhase::SignupSent {
                        summary.approvals.skip();
                    }
                    summary.merge(&self.populator.populate(&account.id).await);
                    return summary;
                }
            }

            phase = next;
        }
    }
}
