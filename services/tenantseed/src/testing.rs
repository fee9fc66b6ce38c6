//! In-memory stand-in for the account management API.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::components::admin_client::{AdminTransport, ApiParams, ClientError, ParamValue};
use crate::models::account::AccountState;
use crate::models::provenance::PROVENANCE_KEY;
use crate::models::user::UserState;

const ACCOUNTS_PREFIX: &str = "/admin/api/accounts/";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub params: ApiParams,
}

struct StoredAccount {
    org_name: String,
    state: &'static str,
    created_by: Option<String>,
}

impl StoredAccount {
    fn to_json(&self, id: u64) -> Value {
        let mut account = Map::new();
        account.insert("id".into(), json!(id));
        account.insert("org_name".into(), json!(self.org_name));
        account.insert("state".into(), json!(self.state));
        if let Some(created_by) = &self.created_by {
            account.insert(PROVENANCE_KEY.into(), json!(created_by));
        }

        json!({ "account": Value::Object(account) })
    }
}

struct State {
    plans: Vec<(u64, String)>,
    accounts: BTreeMap<u64, StoredAccount>,
    next_id: u64,
    signup_state: &'static str,
    user_state: &'static str,
    signups_allowed: Option<usize>,
    failing_paths: Vec<String>,
    failing_suffixes: Vec<String>,
    raw: HashMap<String, Value>,
    calls: Vec<RecordedCall>,
}

pub struct FakeAdminApi {
    state: Mutex<State>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for FakeAdminApi {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                plans: Vec::new(),
                accounts: BTreeMap::new(),
                next_id: 1000,
                signup_state: "created",
                user_state: "pending",
                signups_allowed: None,
                failing_paths: Vec::new(),
                failing_suffixes: Vec::new(),
                raw: HashMap::new(),
                calls: Vec::new(),
            }),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

fn account_state_name(state: AccountState) -> &'static str {
    match state {
        AccountState::Created => "created",
        AccountState::Pending => "pending",
        AccountState::Approved => "approved",
        AccountState::Rejected => "rejected",
        AccountState::Suspended => "suspended",
        AccountState::Unknown => "archived",
    }
}

fn user_state_name(state: UserState) -> &'static str {
    match state {
        UserState::Pending => "pending",
        UserState::Active => "active",
        UserState::Suspended => "suspended",
        UserState::Unknown => "invited",
    }
}

fn text(params: &ApiParams, key: &str) -> Option<String> {
    params.get(key).map(|value| value.to_string())
}

fn number(params: &ApiParams, key: &str) -> Option<u64> {
    match params.get(key) {
        Some(ParamValue::Number(n)) if *n > 0 => Some(*n as u64),
        Some(ParamValue::Text(s)) => s.parse().ok(),
        _ => None,
    }
}

fn status_error(method: &Method, path: &str, status: u16) -> ClientError {
    ClientError::Status {
        method: method.clone(),
        path: path.to_string(),
        status,
        body: json!({ "error": "fake failure" }).to_string(),
    }
}

impl FakeAdminApi {
    pub fn with_plans(names: &[&str]) -> Self {
        let api = Self::default();
        api.lock().plans = names
            .iter()
            .enumerate()
            .map(|(index, name)| (100 + index as u64, name.to_string()))
            .collect();
        api
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_signup_state(&self, state: AccountState) {
        self.lock().signup_state = account_state_name(state);
    }

    pub fn set_user_state(&self, state: UserState) {
        self.lock().user_state = user_state_name(state);
    }

    /// Signups beyond the first `allowed` ones answer with an error.
    pub fn fail_signups_after(&self, allowed: usize) {
        self.lock().signups_allowed = Some(allowed);
    }

    pub fn fail_path(&self, path: &str) {
        self.lock().failing_paths.push(path.to_string());
    }

    pub fn fail_suffix(&self, suffix: &str) {
        self.lock().failing_suffixes.push(suffix.to_string());
    }

    pub fn respond_raw(&self, path: &str, value: Value) {
        self.lock().raw.insert(path.to_string(), value);
    }

    /// Seeds accounts that exist before the run, returning their ids.
    pub fn add_accounts(&self, count: usize, tagged: bool) -> Vec<String> {
        let mut state = self.lock();

        (0..count)
            .map(|index| {
                state.next_id += 1;
                let id = state.next_id;
                state.accounts.insert(
                    id,
                    StoredAccount {
                        org_name: format!("Existing {}", index),
                        state: "approved",
                        created_by: if tagged { Some("script".into()) } else { None },
                    },
                );
                id.to_string()
            })
            .collect()
    }

    /// Seeds one approved, tagged account under a fixed id.
    pub fn add_account(&self, id: u64) {
        self.lock().accounts.insert(
            id,
            StoredAccount {
                org_name: format!("Seeded {}", id),
                state: "approved",
                created_by: Some("script".into()),
            },
        );
    }

    pub fn remaining_accounts(&self) -> usize {
        self.lock().accounts.len()
    }

    pub fn plan_ids(&self) -> Vec<String> {
        self.lock()
            .plans
            .iter()
            .map(|(id, _)| id.to_string())
            .collect()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn calls_matching(&self, method: &Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == *method && call.path == path)
            .collect()
    }

    pub fn calls_to(&self, method: &Method, path: &str) -> usize {
        self.calls_matching(method, path).len()
    }

    pub fn calls_with_suffix(&self, method: &Method, suffix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.method == *method && call.path.ends_with(suffix))
            .count()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn handle(&self, method: &Method, path: &str, params: &ApiParams) -> Result<Value, ClientError> {
        let mut state = self.lock();

        state.calls.push(RecordedCall {
            method: method.clone(),
            path: path.to_string(),
            params: params.clone(),
        });

        if let Some(value) = state.raw.get(path) {
            return Ok(value.clone());
        }

        let failing = state.failing_paths.iter().any(|failing| failing == path)
            || state
                .failing_suffixes
                .iter()
                .any(|suffix| path.ends_with(suffix.as_str()));
        if failing {
            return Err(status_error(method, path, 500));
        }

        match (method.as_str(), path) {
            ("GET", "/admin/api/application_plans.json") => {
                let plans: Vec<_> = state
                    .plans
                    .iter()
                    .map(|(id, name)| json!({ "application_plan": { "id": id, "name": name } }))
                    .collect();
                Ok(json!({ "plans": plans }))
            }
            ("POST", "/admin/api/signup.json") => {
                if let Some(allowed) = state.signups_allowed {
                    if allowed == 0 {
                        return Err(status_error(method, path, 422));
                    }
                    state.signups_allowed = Some(allowed - 1);
                }

                state.next_id += 1;
                let id = state.next_id;
                let account = StoredAccount {
                    org_name: text(params, "org_name").unwrap_or_default(),
                    state: state.signup_state,
                    created_by: text(params, PROVENANCE_KEY),
                };
                let body = account.to_json(id);
                state.accounts.insert(id, account);
                Ok(body)
            }
            ("GET", "/admin/api/accounts.json") => {
                let listing: Vec<_> = state
                    .accounts
                    .iter()
                    .map(|(id, account)| account.to_json(*id))
                    .collect();

                let listing = match (number(params, "page"), number(params, "per_page")) {
                    (Some(page), Some(per_page)) => listing
                        .into_iter()
                        .skip(((page - 1) * per_page) as usize)
                        .take(per_page as usize)
                        .collect(),
                    _ => listing,
                };

                Ok(json!({ "accounts": listing }))
            }
            (_, path) if path.starts_with(ACCOUNTS_PREFIX) => {
                let rest = &path[ACCOUNTS_PREFIX.len()..];
                let segments: Vec<_> = rest.split('/').collect();
                self.handle_account(&mut state, method, path, &segments, params)
            }
            _ => Err(status_error(method, path, 404)),
        }
    }

    fn handle_account(
        &self,
        state: &mut State,
        method: &Method,
        path: &str,
        segments: &[&str],
        params: &ApiParams,
    ) -> Result<Value, ClientError> {
        let id_segment = segments[0].trim_end_matches(".json");
        let account_id = match id_segment.parse::<u64>() {
            Ok(id) if state.accounts.contains_key(&id) => id,
            _ => return Err(status_error(method, path, 404)),
        };

        match (method.as_str(), &segments[1..]) {
            ("DELETE", []) => {
                state.accounts.remove(&account_id);
                Ok(Value::Null)
            }
            ("PUT", ["approve.json"]) => {
                let account = state
                    .accounts
                    .get_mut(&account_id)
                    .ok_or_else(|| status_error(method, path, 404))?;
                account.state = "approved";
                Ok(account.to_json(account_id))
            }
            ("POST", ["applications.json"]) => {
                state.next_id += 1;
                Ok(json!({
                    "application": {
                        "id": state.next_id,
                        "name": text(params, "name"),
                        "plan_id": text(params, "plan_id"),
                    }
                }))
            }
            ("POST", ["users.json"]) => {
                state.next_id += 1;
                Ok(json!({
                    "user": {
                        "id": state.next_id,
                        "username": text(params, "username"),
                        "email": text(params, "email"),
                        "state": state.user_state,
                    }
                }))
            }
            ("PUT", ["users", user_id, "activate.json"]) => Ok(json!({
                "user": { "id": user_id, "state": "active" }
            })),
            _ => Err(status_error(method, path, 404)),
        }
    }
}

#[async_trait::async_trait]
impl AdminTransport for FakeAdminApi {
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &ApiParams,
    ) -> Result<Value, ClientError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        // Let other requests start so overlap is observable.
        tokio::task::yield_now().await;

        let res = self.handle(&method, path, params);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        res
    }
}
