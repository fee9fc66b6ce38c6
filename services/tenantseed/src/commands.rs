use component_store::{ComponentName, ComponentStore, ConfigProvider};

use crate::components;
use crate::models::summary::RunReport;

///
/// Provisions the configured number of accounts, each populated with
/// applications and users.
///
/// The store fetches the plan catalog while it is built, so an unreachable
/// host or a missing token ends the run before any account is created.
///
pub async fn create(config: Box<dyn ConfigProvider>) -> anyhow::Result<RunReport> {
    let report = RunReport::start("create");

    let component_store = ComponentStore::builder()
        .register::<components::AdminClient>()?
        .register::<components::PlanCatalog>()?
        .register::<components::FakeData>()?
        .register::<components::UserActivator>()?
        .register::<components::ResourcePopulator>()?
        .register::<components::AccountProvisioner>()?
        .build(config)
        .await?;

    let provisioner = component_store
        .resolve::<components::AccountProvisioner>()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Component {} is not available",
                components::AccountProvisioner::component_name()
            )
        })?;

    let res = provisioner.run().await;
    component_store.destroy().await;

    let report = report.finish(res?);
    report.log();

    Ok(report)
}

///
/// Deletes every account carrying the provenance tag.
///
pub async fn cleanup(config: Box<dyn ConfigProvider>) -> anyhow::Result<RunReport> {
    let report = RunReport::start("cleanup");

    let component_store = ComponentStore::builder()
        .register::<components::AdminClient>()?
        .register::<components::CleanupScanner>()?
        .build(config)
        .await?;

    let scanner = component_store
        .resolve::<components::CleanupScanner>()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Component {} is not available",
                components::CleanupScanner::component_name()
            )
        })?;

    let res = scanner.cleanup().await;
    component_store.destroy().await;

    let report = report.finish(res?);
    report.log();

    Ok(report)
}
