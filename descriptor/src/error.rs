// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a descriptor document into a [`crate::KernelDescriptor`].
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The document could not be read from disk.
    #[error("cannot read descriptor {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML or does not have the expected shape.
    #[error("malformed descriptor document: {0}")]
    Document(#[from] quick_xml::DeError),

    /// A required attribute is missing or holds a value that cannot be parsed.
    #[error("malformed descriptor: {element}: attribute `{attribute}` {reason}")]
    MalformedDescriptor {
        element: String,
        attribute: String,
        reason: String,
    },

    /// An argument is routed through a port the kernel does not declare.
    #[error("argument `{arg}` references unknown port `{port}`")]
    UnresolvedPort { arg: String, port: String },
}

impl DescriptorError {
    pub(crate) fn malformed(
        element: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DescriptorError::MalformedDescriptor {
            element: element.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DescriptorError>;
