// Licensed under the Apache-2.0 license

//! Register-map script generator for Vitis `.xo` packaging.
//!
//! Turns a [`KernelDescriptor`](xo_descriptor::KernelDescriptor) into the
//! Tcl statements that declare the kernel's control registers, bind pointer
//! arguments to their AXI master interfaces and tidy up stream interfaces.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use xo_descriptor::KernelDescriptor;
//! use xo_regmap_generator::{generate_register_map, RegisterMapConfig};
//!
//! let kernel = KernelDescriptor::from_file(Path::new("kernel.xml")).unwrap();
//! let map = generate_register_map(&kernel, &RegisterMapConfig::default()).unwrap();
//! std::fs::write("kernel_regs.tcl", map.to_tcl()).unwrap();
//! ```
//!
//! ## Generation Flow
//!
//! ```text
//! KernelDescriptor → RegisterMap { block, statements: Vec<Statement> } → Tcl text
//!                    (synth)                                             (tcl)
//! ```

pub mod statement;

mod synth;
mod tcl;

pub use statement::{AddressBlock, Register, RegisterMap, Statement};
pub use synth::{generate_register_map, RegisterMapConfig, RESERVED_REGISTERS};
pub use tcl::TCL_PRELUDE;

use thiserror::Error;

/// Errors raised while building a register map from a kernel descriptor.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeneratorError {
    /// An argument is routed through a port that the descriptor does not declare.
    #[error("argument `{arg}` references unknown port `{port}`")]
    UnresolvedPort { arg: String, port: String },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
