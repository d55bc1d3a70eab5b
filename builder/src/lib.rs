// Licensed under the Apache-2.0 license

//! Prepares Vitis HLS kernels for `.xo` packaging.
//!
//! - [`config`]: [`PackConfig`], the explicit run configuration
//! - [`template`]: line-level patching of the master packaging script
//! - [`pack`]: the [`prepare_pack_xo`] pipeline and its [`PackLayout`]

pub mod config;
pub mod error;
pub mod fs;
pub mod pack;
pub mod template;

pub use config::{PackConfig, MASTER_TEMPLATE};
pub use error::{PackError, Result};
pub use pack::{prepare_pack_xo, PackLayout, SourceCategory};
pub use template::{patch, PatchOutcome, PatchRule, Template};
