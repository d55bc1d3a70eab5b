// Licensed under the Apache-2.0 license

//! Typed statements of a register-map script.
//!
//! The synthesizer only produces these values; turning them into text is the
//! job of the Tcl emitter, so statement order and content can be tested
//! without looking at formatting.

/// A control register inside the kernel's address block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    /// Byte offset from the start of the address block.
    pub offset: u64,
    /// Width in bits.
    pub width: u64,
    pub description: String,
}

/// The address block that holds the control registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressBlock {
    /// Memory map (AXI4-Lite slave interface) owning the block.
    pub memory_map: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// Renames an HLS-generated bus interface to the argument's name.
    InterfaceRename { from: String, to: String },
    /// Associates a bus interface with a clock.
    ClockAssociation { interface: String, clock: String },
    /// Declares a register in the address block.
    RegisterDeclaration(Register),
    /// Points a register at the memory interface it addresses.
    RegisterBinding { register: String, interface: String },
}

/// Ordered statements for one kernel plus the block they refer to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterMap {
    pub block: AddressBlock,
    pub statements: Vec<Statement>,
}

impl RegisterMap {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn registers(&self) -> impl Iterator<Item = &Register> {
        self.statements.iter().filter_map(|s| match s {
            Statement::RegisterDeclaration(reg) => Some(reg),
            _ => None,
        })
    }

    /// `(register, interface)` pairs of every binding statement.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.statements.iter().filter_map(|s| match s {
            Statement::RegisterBinding {
                register,
                interface,
            } => Some((register.as_str(), interface.as_str())),
            _ => None,
        })
    }

    /// Whether the script needs the address block and its helper procedures.
    pub fn uses_address_block(&self) -> bool {
        self.statements.iter().any(|s| {
            matches!(
                s,
                Statement::RegisterDeclaration(_) | Statement::RegisterBinding { .. }
            )
        })
    }
}
