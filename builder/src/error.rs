// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;
use xo_descriptor::DescriptorError;
use xo_regmap_generator::GeneratorError;

#[derive(Error, Debug)]
pub enum PackError {
    /// A required setting is missing or unusable. Raised before any work.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Some template settings were not found, so the packaging script still
    /// holds placeholder values.
    #[error("{} was only partially patched; no line matched: {}", path.display(), unsatisfied.join(", "))]
    IncompletePatch {
        path: PathBuf,
        unsatisfied: Vec<String>,
    },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PackError::Io {
            action,
            path,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
