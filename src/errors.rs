mod build;
mod config;
mod provision;
mod publish;
mod resolve;
mod store;

pub use build::BuildErrorKind;
pub use config::ConfigErrorKind;
pub use provision::ProvisionErrorKind;
pub use publish::PublishErrorKind;
pub use resolve::ResolveErrorKind;
pub use store::StoreErrorKind;
