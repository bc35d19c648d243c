use super::provision::ProvisionErrorKind;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Provisioner for {} not found in registry", type_info.name)]
    NoProvisioner { type_info: TypeInfo },
    #[error("Registered provisioner provides another type. Expected: {}", expected.name)]
    IncorrectType { expected: TypeInfo },
    #[error(transparent)]
    Provision(#[from] ProvisionErrorKind),
}
