use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use component_store::prelude::*;

use crate::components::admin_client::{AdminClient, ClientError};
use crate::models::account::Account;
use crate::models::summary::RunSummary;

/// Page size the admin API uses when none is requested.
const SERVER_PAGE_SIZE: usize = 500;

/// An unpaginated listing filling whole server pages may have more behind it.
fn looks_truncated(len: usize) -> bool {
    len > 0 && len % SERVER_PAGE_SIZE == 0
}

///
/// Deletes every listed account carrying the provenance tag and nothing else.
///
pub struct CleanupScanner {
    client: Arc<AdminClient>,
    per_page: Option<u64>,
}

impl InitComponent for CleanupScanner {
    fn init(
        resolver: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<Self, ComponentError>> {
        Box::pin(async move {
            let per_page = config.get_opt_u64("per_page")?.filter(|per_page| *per_page > 0);
            let client = resolver.resolve::<AdminClient>().await?;

            Ok(CleanupScanner::new(client, per_page))
        })
    }
}

impl ShutdownComponent for CleanupScanner {}

impl ComponentName for CleanupScanner {
    fn component_name() -> &'static str {
        "cleanup-scanner"
    }
}

impl Component for CleanupScanner {}

impl CleanupScanner {
    pub fn new(client: Arc<AdminClient>, per_page: Option<u64>) -> Self {
        Self { client, per_page }
    }

    ///
    /// Fails only when the listing cannot be read. The listing is complete
    /// before the first delete is sent.
    ///
    pub async fn cleanup(&self) -> Result<RunSummary, ClientError> {
        let accounts = self.list_accounts().await?;

        let (tagged, untouched): (Vec<_>, Vec<_>) = accounts
            .into_iter()
            .partition(|account| account.is_script_created());

        tracing::info!(
            "Deleting {} accounts, leaving {} untouched",
            tagged.len(),
            untouched.len()
        );

        let mut summary: RunSummary = join_all(tagged.iter().map(|account| self.delete(account)))
            .await
            .into_iter()
            .collect();
        summary.untouched = untouched.len();

        Ok(summary)
    }

    async fn delete(&self, account: &Account) -> RunSummary {
        let mut summary = RunSummary::default();

        match self.client.delete_account(&account.id).await {
            Ok(()) => {
                tracing::info!(
                    "Just deleted a 'account' with id = {} and name = {}",
                    account.id,
                    account.display_name()
                );
                summary.deletions.success();
            }
            Err(err) => {
                tracing::warn!("Failed to delete account {}: {}", account.id, err);
                summary.deletions.failure();
            }
        }

        summary
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, ClientError> {
        let per_page = match self.per_page {
            Some(per_page) => per_page,
            None => {
                let accounts = self.client.list_accounts(None).await?;
                if looks_truncated(accounts.len()) {
                    tracing::warn!(
                        "The account listing returned {} entries and may be truncated, set a page size to read every page",
                        accounts.len()
                    );
                }
                return Ok(accounts);
            }
        };

        let mut accounts = Vec::new();
        let mut seen = HashSet::new();

        for page in 1.. {
            let batch = self.client.list_accounts(Some((page, per_page))).await?;
            let batch_len = batch.len();

            let before = accounts.len();
            accounts.extend(
                batch
                    .into_iter()
                    .filter(|account| seen.insert(account.id.clone())),
            );

            if (batch_len as u64) < per_page {
                break;
            }

            if accounts.len() == before {
                tracing::warn!("Page {} of the account listing repeats earlier entries, stopping", page);
                break;
            }
        }

        Ok(accounts)
    }
}
