pub mod admin_client;

mod account_provisioner;
mod cleanup_scanner;
mod fake_data;
mod plan_catalog;
mod resource_populator;
mod user_activator;

pub use account_provisioner::AccountProvisioner;
pub use admin_client::AdminClient;
pub use cleanup_scanner::CleanupScanner;
pub use fake_data::FakeData;
pub use plan_catalog::{CatalogError, PlanCatalog};
pub use resource_populator::ResourcePopulator;
pub use user_activator::UserActivator;
