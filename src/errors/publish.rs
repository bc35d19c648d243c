use std::{io, path::PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum PublishErrorKind {
    #[error("Failed to publish to {}: {source}", destination.display())]
    Io { destination: PathBuf, source: io::Error },
}
