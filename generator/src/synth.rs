// Licensed under the Apache-2.0 license

use crate::statement::{AddressBlock, Register, RegisterMap, Statement};
use crate::{GeneratorError, Result};
use log::debug;
use xo_descriptor::{Argument, KernelDescriptor};

/// Registers present at the start of every control block:
/// `(name, offset, description)`, all 32 bits wide.
pub const RESERVED_REGISTERS: [(&str, u64, &str); 4] = [
    ("CTRL", 0, "Control Register"),
    ("GIER", 4, "Global Interrupt Enable Register"),
    ("IP_IER", 8, "IP Interrupt Enable Register"),
    ("IP_ISR", 12, "IP Interrupt Status Register"),
];

const RESERVED_REGISTER_WIDTH: u64 = 32;

/// Names used by the generated script that do not come from the descriptor.
///
/// # Example
///
/// ```
/// use xo_regmap_generator::RegisterMapConfig;
///
/// let config = RegisterMapConfig::default().clock("ap_clk_2");
/// assert_eq!(config.control_interface, "s_axi_control");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterMapConfig {
    /// Clock every bus interface is associated with.
    pub clock: String,
    /// AXI4-Lite slave whose memory map holds the control registers.
    pub control_interface: String,
    /// Address block inside that memory map.
    pub address_block: String,
}

impl Default for RegisterMapConfig {
    fn default() -> Self {
        Self {
            clock: "ap_clk".to_string(),
            control_interface: "s_axi_control".to_string(),
            address_block: "reg0".to_string(),
        }
    }
}

impl RegisterMapConfig {
    pub fn clock(mut self, clock: &str) -> Self {
        self.clock = clock.to_string();
        self
    }

    pub fn control_interface(mut self, interface: &str) -> Self {
        self.control_interface = interface.to_string();
        self
    }

    pub fn address_block(mut self, block: &str) -> Self {
        self.address_block = block.to_string();
        self
    }
}

fn resolved_interface(kernel: &KernelDescriptor, arg: &Argument) -> Result<String> {
    kernel
        .port_of(arg)
        .map(|port| port.interface_name())
        .ok_or_else(|| GeneratorError::UnresolvedPort {
            arg: arg.name.clone(),
            port: arg.port_name.clone(),
        })
}

/// Builds the register-map statements for a kernel.
///
/// Statements come out in this order:
/// 1. stream interface renames, then their clock associations;
/// 2. unless the kernel is free-running (`ap_ctrl_none`): the reserved
///    registers, clock associations for every addressable port, one
///    register per non-stream argument and one binding per non-stream
///    pointer argument.
///
/// Within each group arguments keep declaration order and ports are sorted
/// by name, so the same descriptor always yields the same map.
pub fn generate_register_map(
    kernel: &KernelDescriptor,
    config: &RegisterMapConfig,
) -> Result<RegisterMap> {
    // Resolve every argument up front so a broken descriptor fails before
    // any statement is produced.
    let interfaces = kernel
        .args
        .iter()
        .map(|arg| resolved_interface(kernel, arg))
        .collect::<Result<Vec<_>>>()?;

    let mut statements = Vec::new();

    for arg in kernel.stream_args() {
        // Presence was checked above.
        if let Some(port) = kernel.port_of(arg) {
            statements.push(Statement::InterfaceRename {
                from: port.name.clone(),
                to: arg.name.clone(),
            });
        }
    }
    for arg in kernel.stream_args() {
        statements.push(Statement::ClockAssociation {
            interface: arg.name.clone(),
            clock: config.clock.clone(),
        });
    }

    if kernel.control_protocol.has_control_block() {
        for (name, offset, description) in RESERVED_REGISTERS {
            statements.push(Statement::RegisterDeclaration(Register {
                name: name.to_string(),
                offset,
                width: RESERVED_REGISTER_WIDTH,
                description: description.to_string(),
            }));
        }

        for port in kernel.addressable_ports() {
            statements.push(Statement::ClockAssociation {
                interface: port.interface_name(),
                clock: config.clock.clone(),
            });
        }

        for arg in kernel.register_args() {
            statements.push(Statement::RegisterDeclaration(Register {
                name: arg.name.clone(),
                offset: arg.offset,
                width: arg.register_width(),
                description: format!("{}_DATA", arg.name),
            }));
        }

        for (arg, interface) in kernel.args.iter().zip(interfaces) {
            if arg.has_register() && arg.is_pointer {
                statements.push(Statement::RegisterBinding {
                    register: arg.name.clone(),
                    interface,
                });
            }
        }
    } else {
        debug!(
            "Kernel {} is free-running; skipping the control register block",
            kernel.name
        );
    }

    debug!(
        "Generated {} register-map statements for kernel {}",
        statements.len(),
        kernel.name
    );

    Ok(RegisterMap {
        block: AddressBlock {
            memory_map: config.control_interface.clone(),
            name: config.address_block.clone(),
        },
        statements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use xo_descriptor::{ControlProtocol, Port, PortKind, PortMode};

    fn port(name: &str, kind: PortKind) -> (String, Port) {
        (
            name.to_string(),
            Port {
                name: name.to_string(),
                mode: PortMode::Master,
                kind,
                data_width: 32,
                base: 0,
                range: 0x1000,
            },
        )
    }

    fn arg(name: &str, port: &str, pointer: bool, stream: bool, offset: u64, size: u64) -> Argument {
        Argument {
            name: name.to_string(),
            declared_type: if pointer { "int*" } else { "int" }.to_string(),
            is_pointer: pointer,
            is_stream: stream,
            port_name: port.to_string(),
            size,
            offset,
        }
    }

    /// Stream input `in_v` on `in_V`, pointer `out_ptr` on `m_axi_out`.
    fn scenario_a(protocol: ControlProtocol) -> KernelDescriptor {
        KernelDescriptor {
            name: "copy".to_string(),
            control_protocol: protocol,
            uses_interrupt: false,
            ports: BTreeMap::from([
                port("in_V", PortKind::Stream),
                port("m_axi_out", PortKind::Addressable),
                port("s_axi_control", PortKind::Addressable),
            ]),
            args: vec![
                arg("in_v", "in_V", false, true, 0, 4),
                arg("out_ptr", "m_axi_out", true, false, 0x10, 0x8),
            ],
        }
    }

    fn rename(from: &str, to: &str) -> Statement {
        Statement::InterfaceRename {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn clock(interface: &str) -> Statement {
        Statement::ClockAssociation {
            interface: interface.to_string(),
            clock: "ap_clk".to_string(),
        }
    }

    fn reg(name: &str, offset: u64, width: u64, description: &str) -> Statement {
        Statement::RegisterDeclaration(Register {
            name: name.to_string(),
            offset,
            width,
            description: description.to_string(),
        })
    }

    #[test]
    fn test_scenario_a_statements() {
        let kernel = scenario_a(ControlProtocol::ApCtrlHs);
        let map = generate_register_map(&kernel, &RegisterMapConfig::default()).unwrap();
        assert_eq!(
            map.statements,
            vec![
                rename("in_V", "in_v"),
                clock("in_v"),
                reg("CTRL", 0, 32, "Control Register"),
                reg("GIER", 4, 32, "Global Interrupt Enable Register"),
                reg("IP_IER", 8, 32, "IP Interrupt Enable Register"),
                reg("IP_ISR", 12, 32, "IP Interrupt Status Register"),
                clock("m_axi_out"),
                clock("s_axi_control"),
                reg("out_ptr", 16, 64, "out_ptr_DATA"),
                Statement::RegisterBinding {
                    register: "out_ptr".to_string(),
                    interface: "m_axi_out".to_string(),
                },
            ]
        );
        assert_eq!(map.block.memory_map, "s_axi_control");
        assert_eq!(map.block.name, "reg0");
    }

    #[test]
    fn test_free_running_kernel_has_no_registers() {
        let kernel = scenario_a(ControlProtocol::ApCtrlNone);
        let map = generate_register_map(&kernel, &RegisterMapConfig::default()).unwrap();
        assert_eq!(map.registers().count(), 0);
        assert_eq!(map.bindings().count(), 0);
        assert!(!map.uses_address_block());
        assert_eq!(map.statements, vec![rename("in_V", "in_v"), clock("in_v")]);
    }

    #[test]
    fn test_free_running_kernel_without_streams_is_empty() {
        let mut kernel = scenario_a(ControlProtocol::ApCtrlNone);
        kernel.args.retain(|arg| !arg.is_stream);
        let map = generate_register_map(&kernel, &RegisterMapConfig::default()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_reserved_registers_precede_arguments() {
        for protocol in [
            ControlProtocol::ApCtrlHs,
            ControlProtocol::ApCtrlChain,
            ControlProtocol::UserManaged,
        ] {
            let kernel = scenario_a(protocol);
            let map = generate_register_map(&kernel, &RegisterMapConfig::default()).unwrap();
            let names: Vec<&str> = map.registers().map(|r| r.name.as_str()).collect();
            assert_eq!(names, ["CTRL", "GIER", "IP_IER", "IP_ISR", "out_ptr"]);
            assert!(map.registers().take(4).all(|r| r.width == 32));
        }
    }

    #[test]
    fn test_one_binding_per_pointer_lowercased() {
        let mut kernel = scenario_a(ControlProtocol::ApCtrlHs);
        kernel.ports.extend([port("M_AXI_GMEM", PortKind::Addressable)]);
        kernel.args.push(arg("a", "M_AXI_GMEM", true, false, 0x1c, 8));
        kernel.args.push(arg("n", "s_axi_control", false, false, 0x28, 4));
        kernel.args.push(arg("b", "M_AXI_GMEM", true, false, 0x30, 8));
        let map = generate_register_map(&kernel, &RegisterMapConfig::default()).unwrap();
        let bindings: Vec<(&str, &str)> = map.bindings().collect();
        assert_eq!(
            bindings,
            [
                ("out_ptr", "m_axi_out"),
                ("a", "m_axi_gmem"),
                ("b", "m_axi_gmem"),
            ]
        );
        let scalar = map.registers().find(|r| r.name == "n").unwrap();
        assert_eq!((scalar.offset, scalar.width), (0x28, 32));
    }

    #[test]
    fn test_streams_keep_declaration_order() {
        let mut kernel = scenario_a(ControlProtocol::ApCtrlNone);
        kernel.ports.extend([port("a_V", PortKind::Stream)]);
        kernel.args.push(arg("a", "a_V", false, true, 0, 4));
        let map = generate_register_map(&kernel, &RegisterMapConfig::default()).unwrap();
        assert_eq!(
            map.statements,
            vec![
                rename("in_V", "in_v"),
                rename("a_V", "a"),
                clock("in_v"),
                clock("a"),
            ]
        );
    }

    #[test]
    fn test_custom_clock() {
        let kernel = scenario_a(ControlProtocol::ApCtrlNone);
        let config = RegisterMapConfig::default().clock("ap_clk_2");
        let map = generate_register_map(&kernel, &config).unwrap();
        assert!(map.statements.contains(&Statement::ClockAssociation {
            interface: "in_v".to_string(),
            clock: "ap_clk_2".to_string(),
        }));
    }

    #[test]
    fn test_unresolved_port() {
        let mut kernel = scenario_a(ControlProtocol::ApCtrlHs);
        kernel.ports.remove("m_axi_out");
        assert_eq!(
            generate_register_map(&kernel, &RegisterMapConfig::default()),
            Err(GeneratorError::UnresolvedPort {
                arg: "out_ptr".to_string(),
                port: "m_axi_out".to_string(),
            })
        );
    }

    #[test]
    fn test_deterministic() {
        let kernel = scenario_a(ControlProtocol::ApCtrlHs);
        let config = RegisterMapConfig::default();
        assert_eq!(
            generate_register_map(&kernel, &config),
            generate_register_map(&kernel, &config)
        );
    }
}
