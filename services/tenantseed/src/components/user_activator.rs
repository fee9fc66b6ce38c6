use std::sync::Arc;

use component_store::prelude::*;

use crate::components::admin_client::AdminClient;
use crate::models::account::AccountId;
use crate::models::summary::RunSummary;
use crate::models::user::{User, UserAction, UserEvent, UserPhase};

pub struct UserActivator {
    client: Arc<AdminClient>,
}

impl InitComponent for UserActivator {
    fn init(
        resolver: ComponentResolver,
        _: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<Self, ComponentError>> {
        Box::pin(async move {
            let client = resolver.resolve::<AdminClient>().await?;

            Ok(UserActivator::new(client))
        })
    }
}

impl ShutdownComponent for UserActivator {}

impl ComponentName for UserActivator {
    fn component_name() -> &'static str {
        "user-activator"
    }
}

impl Component for UserActivator {}

impl UserActivator {
    pub fn new(client: Arc<AdminClient>) -> Self {
        Self { client }
    }

    ///
    /// Issues exactly one activation for a pending user, nothing otherwise.
    ///
    pub async fn activate_if_pending(&self, user: &User, account_id: &AccountId) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut phase = UserPhase::Created;
        let mut event = UserEvent::Reported(user.state);

        loop {
            let (next, action) = match phase.on(event) {
                Ok(transition) => transition,
                Err(err) => {
                    tracing::warn!("{}", err);
                    summary.activations.failure();
                    return summary;
                }
            };

            match action {
                UserAction::Activate => match self.client.activate_user(account_id, &user.id).await {
                    Ok(_) => {
                        tracing::info!(
                            "Just activated a 'user' with id = {} and name = {}",
                            user.id,
                            user.display_name()
                        );
                        summary.activations.success();
                        event = UserEvent::Activated;
                    }
                    Err(err) => {
                        tracing::warn!("Failed to activate user {}: {}", user.id, err);
                        summary.activations.failure();
                        return summary;
                    }
                },
                UserAction::Finish => {
                    if phase == UserPhase::Created {
                        summary.activations.skip();
                    }
                    return summary;
                }
            }

            phase = next;
        }
    }
}
