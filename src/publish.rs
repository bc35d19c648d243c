use alloc::{borrow::Cow, vec::Vec};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info};

use crate::{config::DEFAULT_CONFIG_TOML, errors::PublishErrorKind};

struct Publication {
    template: Cow<'static, str>,
    destination: PathBuf,
}

/// Installs templates, such as the default configuration, into the host application.
#[derive(Default)]
pub struct Publisher {
    publications: Vec<Publication>,
}

impl Publisher {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn publishes(mut self, template: impl Into<Cow<'static, str>>, destination: impl AsRef<Path>) -> Self {
        self.publications.push(Publication {
            template: template.into(),
            destination: destination.as_ref().to_path_buf(),
        });
        self
    }

    /// Publishes [`DEFAULT_CONFIG_TOML`] to `destination`
    #[inline]
    #[must_use]
    pub fn default_config(destination: impl AsRef<Path>) -> Self {
        Self::new().publishes(DEFAULT_CONFIG_TOML, destination)
    }

    /// Writes the templates, creating missing parent directories.
    /// Existing destinations are kept unless `force` is set.
    ///
    /// Returns the destinations written.
    ///
    /// # Errors
    /// Returns [`PublishErrorKind::Io`] on the first destination that can't be written
    pub fn publish(&self, force: bool) -> Result<Vec<&Path>, PublishErrorKind> {
        let mut published = Vec::with_capacity(self.publications.len());

        for Publication { template, destination } in &self.publications {
            if !force && destination.exists() {
                debug!(destination = %destination.display(), "Already published, skipped");
                continue;
            }

            write(destination, template).map_err(|source| {
                let err = PublishErrorKind::Io {
                    destination: destination.clone(),
                    source,
                };
                error!("{}", err);
                err
            })?;
            info!(destination = %destination.display(), "Published");

            published.push(destination.as_path());
        }

        Ok(published)
    }
}

fn write(destination: &Path, template: &str) -> std::io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(destination, template)
}
