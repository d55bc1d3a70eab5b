// Licensed under the Apache-2.0 license

//! Tcl rendering of a [`RegisterMap`] for the Vivado IP packager.
//!
//! For a kernel with a control block the output looks like:
//!
//! ```text
//! proc add_reg { name parent_addrblk offset size description } { ... }
//! proc bind_to_gmem { reg_name gmem_name reg_addrblk } { ... }
//!
//! set addrblk [ipx::get_address_blocks reg0 -of_objects [ipx::get_memory_maps s_axi_control -of_objects [ipx::current_core]]]
//!
//! add_reg "CTRL" $addrblk 0 32 "Control Register"
//! ipx::associate_bus_interfaces -busif m_axi_gmem -clock ap_clk [ipx::current_core]
//! add_reg "a" $addrblk 16 64 "a_DATA"
//! bind_to_gmem "a" "m_axi_gmem" $addrblk
//! ```

use crate::statement::{RegisterMap, Statement};
use std::fmt::Write;

/// Helper procedures the register statements call into.
pub const TCL_PRELUDE: &str = r#"proc add_reg { name parent_addrblk offset size description } {
    ipx::add_register $name $parent_addrblk
    set reg [ipx::get_registers $name -of_objects $parent_addrblk]
    set_property display_name $name $reg
    set_property description $description $reg
    set_property size $size $reg
    set_property address_offset $offset $reg
}

proc bind_to_gmem { reg_name gmem_name reg_addrblk } {
    puts [format "INFO: \[User Message\] Binding %s of %s to %s" $reg_name $reg_addrblk $gmem_name]
    set reg [ipx::get_registers $reg_name -of_objects $reg_addrblk]
    ipx::add_register_parameter ASSOCIATED_BUSIF $reg
    set_property value $gmem_name [ipx::get_register_parameters ASSOCIATED_BUSIF -of_objects $reg]
}
"#;

impl Statement {
    /// Renders the statement as a single Tcl command.
    pub fn to_tcl(&self) -> String {
        match self {
            Statement::InterfaceRename { from, to } => format!(
                "set_property name {to} [ipx::get_bus_interfaces {from} -of_objects [ipx::current_core]]"
            ),
            Statement::ClockAssociation { interface, clock } => format!(
                "ipx::associate_bus_interfaces -busif {interface} -clock {clock} [ipx::current_core]"
            ),
            Statement::RegisterDeclaration(reg) => format!(
                "add_reg \"{}\" $addrblk {} {} \"{}\"",
                reg.name, reg.offset, reg.width, reg.description
            ),
            Statement::RegisterBinding {
                register,
                interface,
            } => format!("bind_to_gmem \"{register}\" \"{interface}\" $addrblk"),
        }
    }
}

impl RegisterMap {
    /// Renders the whole script. A map without statements renders to an
    /// empty string; the prelude is only included when registers are used.
    pub fn to_tcl(&self) -> String {
        let mut out = String::new();
        if self.uses_address_block() {
            out.push_str(TCL_PRELUDE);
            out.push('\n');
            writeln!(
                out,
                "set addrblk [ipx::get_address_blocks {} -of_objects [ipx::get_memory_maps {} -of_objects [ipx::current_core]]]",
                self.block.name, self.block.memory_map
            )
            .unwrap();
            out.push('\n');
        }
        for statement in &self.statements {
            writeln!(out, "{}", statement.to_tcl()).unwrap();
        }
        out
    }
}
