use rand::Rng;
use thiserror::Error;

use component_store::{init_err, prelude::*};

use crate::components::admin_client::{AdminClient, ClientError};
use crate::models::plan::Plan;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("No application plan is available, applications cannot be created")]
    EmptyCatalog,
}

///
/// Application plans fetched once when the component starts. The snapshot
/// never changes afterwards and is shared behind the component's `Arc`.
///
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl InitComponent for PlanCatalog {
    fn init(
        resolver: ComponentResolver,
        _: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<Self, ComponentError>> {
        Box::pin(async move {
            let client = resolver.resolve::<AdminClient>().await?;
            let catalog = PlanCatalog::fetch_plans(&client).await.map_err(init_err)?;
            tracing::debug!("Plan catalog holds {} plans", catalog.len());

            Ok(catalog)
        })
    }
}

impl ShutdownComponent for PlanCatalog {}

impl ComponentName for PlanCatalog {
    fn component_name() -> &'static str {
        "plan-catalog"
    }
}

impl Component for PlanCatalog {}

impl PlanCatalog {
    pub fn from_plans(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    pub async fn fetch_plans(client: &AdminClient) -> Result<Self, ClientError> {
        let plans = client.list_plans().await?;

        for plan in plans.iter() {
            tracing::info!("Found an application plan : {}", plan.name);
        }

        Ok(Self::from_plans(plans))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    ///
    /// Uniform pick, `index = floor(random * count)`.
    ///
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Plan, CatalogError> {
        if self.plans.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let index = rng.gen_range(0..self.plans.len());
        Ok(&self.plans[index])
    }
}
