use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use component_store::{init_err, prelude::*};
use inflight_limiter::InFlightLimiter;

use crate::models::account::{Account, AccountEnvelope, AccountId, AccountList};
use crate::models::application::{Application, ApplicationEnvelope, ApplicationRecord};
use crate::models::plan::{Plan, PlanId, PlanList};
use crate::models::user::{User, UserEnvelope, UserId, UserRecord};

use super::conversions::{application_params, member_params, page_params, signup_params};
use super::error::ClientError;
use super::http_transport::{base_url, HttpTransport};
use super::params::ApiParams;
use super::transport::AdminTransport;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn segment(id: &impl AsRef<str>) -> String {
    urlencoding::encode(id.as_ref()).into_owned()
}

///
/// Typed access to the account management API.
///
/// Every request goes through the in-flight limiter; a permit covers one
/// request and is never held across a pipeline.
///
pub struct AdminClient {
    transport: Arc<dyn AdminTransport>,
    limiter: InFlightLimiter,
}

impl InitComponent for AdminClient {
    fn init(
        resolver: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<Self, ComponentError>> {
        Box::pin(AdminClient::create(resolver, config))
    }
}

impl ShutdownComponent for AdminClient {}

impl ComponentName for AdminClient {
    fn component_name() -> &'static str {
        "admin-client"
    }
}

impl Component for AdminClient {}

impl AdminClient {
    async fn create(
        _: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> Result<Self, ComponentError> {
        let host = config.get_required_str("host")?;
        let access_token = config.get_required_str("access_token")?;
        let timeout = config.get_u64_or("timeout_secs", DEFAULT_TIMEOUT_SECS)?;
        let max_in_flight = config.get_opt_u64("max_in_flight")?;

        let url = base_url(host).map_err(init_err)?;
        let transport = HttpTransport::new(
            url,
            access_token.to_string(),
            Duration::from_secs(timeout),
        )
        .map_err(init_err)?;

        let limiter = InFlightLimiter::new(max_in_flight.map(|max| max as usize));
        if let Some(max) = limiter.max_in_flight() {
            tracing::info!("At most {} requests will be in flight", max);
        }

        Ok(Self::new(Arc::new(transport), limiter))
    }

    pub fn new(transport: Arc<dyn AdminTransport>, limiter: InFlightLimiter) -> Self {
        Self { transport, limiter }
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: &ApiParams,
    ) -> Result<Value, ClientError> {
        self.limiter
            .run(self.transport.send(method, path, params))
            .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        what: &'static str,
        method: Method,
        path: &str,
        params: &ApiParams,
    ) -> Result<T, ClientError> {
        let value = self.send(method, path, params).await?;

        serde_json::from_value(value).map_err(|source| ClientError::UnexpectedShape { what, source })
    }

    pub async fn list_plans(&self) -> Result<Vec<Plan>, ClientError> {
        let list: PlanList = self
            .call(
                "application_plans",
                Method::GET,
                "/admin/api/application_plans.json",
                &ApiParams::new(),
            )
            .await?;

        Ok(list
            .plans
            .into_iter()
            .map(|envelope| envelope.application_plan)
            .collect())
    }

    pub async fn signup(&self, admin: &UserRecord, org_name: &str) -> Result<Account, ClientError> {
        let envelope: AccountEnvelope = self
            .call(
                "signup",
                Method::POST,
                "/admin/api/signup.json",
                &signup_params(admin, org_name),
            )
            .await?;

        Ok(envelope.account)
    }

    pub async fn approve_account(&self, account_id: &AccountId) -> Result<Account, ClientError> {
        let path = format!("/admin/api/accounts/{}/approve.json", segment(account_id));
        let envelope: AccountEnvelope = self
            .call("approve", Method::PUT, &path, &ApiParams::new())
            .await?;

        Ok(envelope.account)
    }

    pub async fn create_application(
        &self,
        account_id: &AccountId,
        application: &ApplicationRecord,
        plan_id: &PlanId,
    ) -> Result<Application, ClientError> {
        let path = format!("/admin/api/accounts/{}/applications.json", segment(account_id));
        let envelope: ApplicationEnvelope = self
            .call(
                "application",
                Method::POST,
                &path,
                &application_params(application, plan_id),
            )
            .await?;

        Ok(envelope.application)
    }

    pub async fn create_user(
        &self,
        account_id: &AccountId,
        user: &UserRecord,
    ) -> Result<User, ClientError> {
        let path = format!("/admin/api/accounts/{}/users.json", segment(account_id));
        let envelope: UserEnvelope = self
            .call("user", Method::POST, &path, &member_params(user))
            .await?;

        Ok(envelope.user)
    }

    pub async fn activate_user(
        &self,
        account_id: &AccountId,
        user_id: &UserId,
    ) -> Result<User, ClientError> {
        let path = format!(
            "/admin/api/accounts/{}/users/{}/activate.json",
            segment(account_id),
            segment(user_id)
        );
        let envelope: UserEnvelope = self
            .call("activate", Method::PUT, &path, &ApiParams::new())
            .await?;

        Ok(envelope.user)
    }

    ///
    /// One page of the account listing, or the server's default listing when
    /// `page` is `None`.
    ///
    pub async fn list_accounts(&self, page: Option<(u64, u64)>) -> Result<Vec<Account>, ClientError> {
        let params = match page {
            Some((page, per_page)) => page_params(page, per_page),
            None => ApiParams::new(),
        };

        let list: AccountList = self
            .call("accounts", Method::GET, "/admin/api/accounts.json", &params)
            .await?;

        Ok(list
            .accounts
            .into_iter()
            .map(|envelope| envelope.account)
            .collect())
    }

    pub async fn delete_account(&self, account_id: &AccountId) -> Result<(), ClientError> {
        let path = format!("/admin/api/accounts/{}.json", segment(account_id));
        self.send(Method::DELETE, &path, &ApiParams::new()).await?;

        Ok(())
    }
}
