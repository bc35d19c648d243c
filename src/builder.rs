use alloc::boxed::Box;

use crate::errors::BuildErrorKind;

/// Constructs a resource for a requested version.
///
/// Implemented for closures `FnMut(&str) -> Result<T, E>` where `E: Into<BuildErrorKind>`.
pub trait Builder: Clone + Send + Sync + 'static {
    type Provides: Send + Sync + 'static;
    type Error: Into<BuildErrorKind>;

    fn build(&mut self, version: &str) -> Result<Self::Provides, Self::Error>;
}

impl<F, Provides, Err> Builder for F
where
    F: FnMut(&str) -> Result<Provides, Err> + Clone + Send + Sync + 'static,
    Provides: Send + Sync + 'static,
    Err: Into<BuildErrorKind>,
{
    type Provides = Provides;
    type Error = Err;

    #[inline]
    fn build(&mut self, version: &str) -> Result<Self::Provides, Self::Error> {
        self(version)
    }
}

pub(crate) trait CloneBuild<Provides>: Send + Sync {
    fn build(&mut self, version: &str) -> Result<Provides, BuildErrorKind>;

    #[must_use]
    fn clone_box(&self) -> Box<dyn CloneBuild<Provides>>;
}

impl<B: Builder> CloneBuild<B::Provides> for B {
    #[inline]
    fn build(&mut self, version: &str) -> Result<B::Provides, BuildErrorKind> {
        Builder::build(self, version).map_err(Into::into)
    }

    #[inline]
    fn clone_box(&self) -> Box<dyn CloneBuild<B::Provides>> {
        Box::new(self.clone())
    }
}

pub(crate) struct BoxCloneBuilder<Provides>(Box<dyn CloneBuild<Provides>>);

impl<Provides> BoxCloneBuilder<Provides> {
    #[inline]
    #[must_use]
    pub(crate) fn new<B: Builder<Provides = Provides>>(builder: B) -> Self {
        Self(Box::new(builder))
    }

    #[inline]
    pub(crate) fn build(&mut self, version: &str) -> Result<Provides, BuildErrorKind> {
        self.0.build(version)
    }
}

impl<Provides> Clone for BoxCloneBuilder<Provides> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

/// Wrapper to create a builder that just returns passed value, ignoring the version.
/// It can be used when the resource was created outside the provisioner.
#[inline]
#[must_use]
pub fn instance<T: Clone + Send + Sync + 'static>(val: T) -> impl Builder<Provides = T, Error = BuildErrorKind> {
    move |_: &str| Ok::<_, BuildErrorKind>(val.clone())
}
