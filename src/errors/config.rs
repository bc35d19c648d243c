use alloc::boxed::Box;

#[derive(thiserror::Error, Debug)]
pub enum ConfigErrorKind {
    #[error("Failed to extract configuration: {0}")]
    Extract(Box<figment::Error>),
}

impl From<figment::Error> for ConfigErrorKind {
    #[inline]
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}
