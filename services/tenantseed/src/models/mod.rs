pub mod account;
pub mod application;
pub mod ids;
pub mod lifecycle;
pub mod plan;
pub mod provenance;
pub mod summary;
pub mod user;
