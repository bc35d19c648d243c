use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum BuildErrorKind {
    #[error("Resource version `{version}` is not valid: {reason}")]
    InvalidVersion { version: String, reason: String },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
