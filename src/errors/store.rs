#[derive(thiserror::Error, Debug)]
pub enum StoreErrorKind {
    #[error("Cache store is unavailable")]
    Unavailable,
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
