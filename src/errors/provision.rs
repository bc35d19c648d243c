use alloc::string::String;

use super::{build::BuildErrorKind, store::StoreErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ProvisionErrorKind {
    #[error(transparent)]
    Build(BuildErrorKind),
    #[error(transparent)]
    Store(StoreErrorKind),
    #[error("Cache entry `{cache_key}` holds another type. Expected: {}", expected.name)]
    IncorrectType { cache_key: String, expected: TypeInfo },
}
