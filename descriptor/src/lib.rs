// Licensed under the Apache-2.0 license

//! Typed model of the `kernel.xml` descriptor emitted for a synthesized
//! Vitis HLS kernel.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use xo_descriptor::KernelDescriptor;
//!
//! let kernel = KernelDescriptor::from_file(Path::new("vvadd/kernel.xml")).unwrap();
//! println!("{kernel}");
//! ```
//!
//! ## Module Organization
//!
//! - [`model`]: the immutable kernel model ([`KernelDescriptor`], [`Port`], [`Argument`])
//! - [`error`]: [`DescriptorError`] and the crate [`Result`] alias
//! - [`util`]: hexadecimal and flag parsing helpers

pub mod error;
pub mod model;
pub mod util;

mod parse;

pub use error::{DescriptorError, Result};
pub use model::{
    AddressQualifier, Argument, ControlProtocol, KernelDescriptor, Port, PortKind, PortMode,
    RESERVED_REGISTER_BYTES,
};
