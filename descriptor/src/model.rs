// Licensed under the Apache-2.0 license

//! The kernel model built from a descriptor document.
//!
//! ```text
//! KernelDescriptor
//! ├── ports: BTreeMap<String, Port>   # physical interfaces, keyed by name
//! └── args:  Vec<Argument>            # signature order, each routed via a port
//! ```
//!
//! A descriptor is built once per packaging run and only read afterwards.

use std::collections::BTreeMap;
use std::fmt;

/// Bytes occupied by the CTRL, GIER, IP_IER and IP_ISR registers at the
/// start of every control address block.
pub const RESERVED_REGISTER_BYTES: u64 = 16;

/// Handshake discipline of the kernel control interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlProtocol {
    /// `ap_ctrl_hs`: start/done handshake through the control registers.
    ApCtrlHs,
    /// `ap_ctrl_chain`: handshake with back-pressure (`ap_continue`).
    ApCtrlChain,
    /// `ap_ctrl_none`: free-running, no register-mapped control.
    ApCtrlNone,
    /// `user_managed`: RTL kernels that drive the control block themselves.
    UserManaged,
}

impl ControlProtocol {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ap_ctrl_hs" => Some(ControlProtocol::ApCtrlHs),
            "ap_ctrl_chain" => Some(ControlProtocol::ApCtrlChain),
            "ap_ctrl_none" => Some(ControlProtocol::ApCtrlNone),
            "user_managed" => Some(ControlProtocol::UserManaged),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlProtocol::ApCtrlHs => "ap_ctrl_hs",
            ControlProtocol::ApCtrlChain => "ap_ctrl_chain",
            ControlProtocol::ApCtrlNone => "ap_ctrl_none",
            ControlProtocol::UserManaged => "user_managed",
        }
    }

    /// Whether the kernel exposes the CTRL/GIER/IP_IER/IP_ISR register block.
    pub fn has_control_block(&self) -> bool {
        *self != ControlProtocol::ApCtrlNone
    }
}

impl fmt::Display for ControlProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortMode {
    Master,
    Slave,
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl PortMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "master" => Some(PortMode::Master),
            "slave" => Some(PortMode::Slave),
            "read_only" => Some(PortMode::ReadOnly),
            "write_only" => Some(PortMode::WriteOnly),
            "read_write" => Some(PortMode::ReadWrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PortMode::Master => "master",
            PortMode::Slave => "slave",
            PortMode::ReadOnly => "read_only",
            PortMode::WriteOnly => "write_only",
            PortMode::ReadWrite => "read_write",
        }
    }
}

/// Interface classification of a port (`portType`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Memory-mapped (AXI4 master or AXI4-Lite slave).
    Addressable,
    /// AXI4-Stream.
    Stream,
}

impl PortKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "addressable" => Some(PortKind::Addressable),
            "stream" => Some(PortKind::Stream),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::Addressable => "addressable",
            PortKind::Stream => "stream",
        }
    }
}

/// The `addressQualifier` code of an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressQualifier {
    /// `0`: passed by value through a control register.
    Scalar,
    /// `1`: a global memory pointer.
    Pointer,
    /// `4`: an AXI4-Stream.
    Stream,
}

impl AddressQualifier {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "0" => Some(AddressQualifier::Scalar),
            "1" => Some(AddressQualifier::Pointer),
            "4" => Some(AddressQualifier::Stream),
            _ => None,
        }
    }
}

/// One physical interface of the kernel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub mode: PortMode,
    pub kind: PortKind,
    /// Width of the data channel in bits.
    pub data_width: u32,
    pub base: u64,
    pub range: u64,
}

impl Port {
    pub fn is_addressable(&self) -> bool {
        self.kind == PortKind::Addressable
    }

    /// Bus-interface name as the packager refers to it.
    pub fn interface_name(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.kind.as_str(),
            self.mode.as_str(),
            self.name
        )
    }
}

/// One parameter of the kernel signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    /// Type as written by the upstream compiler, e.g. `int*` or `uint`.
    pub declared_type: String,
    pub is_pointer: bool,
    pub is_stream: bool,
    pub port_name: String,
    /// Width of the register image in bytes.
    pub size: u64,
    /// Byte offset inside the control address block.
    pub offset: u64,
}

impl Argument {
    /// Register width in bits, saturating at `u64::MAX`. Parsed descriptors
    /// never hold a size whose bit width overflows.
    pub fn register_width(&self) -> u64 {
        self.size.saturating_mul(8)
    }

    /// Whether the argument occupies a register in the control block.
    pub fn has_register(&self) -> bool {
        !self.is_stream
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.declared_type, self.name)
    }
}

/// A parsed `kernel.xml`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelDescriptor {
    pub name: String,
    pub control_protocol: ControlProtocol,
    pub uses_interrupt: bool,
    pub ports: BTreeMap<String, Port>,
    /// Declaration order of the source signature.
    pub args: Vec<Argument>,
}

impl KernelDescriptor {
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.get(name)
    }

    /// Port an argument is routed through, if the descriptor declares it.
    pub fn port_of(&self, arg: &Argument) -> Option<&Port> {
        self.port(&arg.port_name)
    }

    pub fn stream_args(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter().filter(|arg| arg.is_stream)
    }

    pub fn register_args(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter().filter(|arg| arg.has_register())
    }

    pub fn addressable_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values().filter(|port| port.is_addressable())
    }
}

/// Renders the kernel as a C prototype followed by its argument-to-port map.
impl fmt::Display for KernelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .args
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "{}({});", self.name, params)?;
        writeln!(f, "/*")?;
        for arg in &self.args {
            let port = self
                .port_of(arg)
                .map(|port| port.name.as_str())
                .unwrap_or("?");
            writeln!(f, "{} : {}", arg.name, port)?;
        }
        write!(f, "*/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, kind: PortKind) -> Port {
        Port {
            name: name.to_string(),
            mode: PortMode::Master,
            kind,
            data_width: 32,
            base: 0,
            range: 0x1000,
        }
    }

    #[test]
    fn test_protocol_strings() {
        for text in ["ap_ctrl_hs", "ap_ctrl_chain", "ap_ctrl_none", "user_managed"] {
            assert_eq!(ControlProtocol::parse(text).unwrap().as_str(), text);
        }
        assert_eq!(ControlProtocol::parse("AP_CTRL_HS"), None);
        assert!(!ControlProtocol::ApCtrlNone.has_control_block());
        assert!(ControlProtocol::ApCtrlChain.has_control_block());
    }

    #[test]
    fn test_interface_name_is_lowercase() {
        assert_eq!(port("M_AXI_GMEM", PortKind::Addressable).interface_name(), "m_axi_gmem");
    }

    #[test]
    fn test_display_signature() {
        let mut ports = BTreeMap::new();
        ports.insert("m_axi_gmem".to_string(), port("m_axi_gmem", PortKind::Addressable));
        ports.insert("s_axi_control".to_string(), port("s_axi_control", PortKind::Addressable));
        let kernel = KernelDescriptor {
            name: "vvadd".to_string(),
            control_protocol: ControlProtocol::ApCtrlHs,
            uses_interrupt: true,
            ports,
            args: vec![
                Argument {
                    name: "a".to_string(),
                    declared_type: "int*".to_string(),
                    is_pointer: true,
                    is_stream: false,
                    port_name: "m_axi_gmem".to_string(),
                    size: 8,
                    offset: 0x10,
                },
                Argument {
                    name: "n".to_string(),
                    declared_type: "uint".to_string(),
                    is_pointer: false,
                    is_stream: false,
                    port_name: "s_axi_control".to_string(),
                    size: 4,
                    offset: 0x1c,
                },
            ],
        };
        assert_eq!(
            kernel.to_string(),
            "vvadd(int* a, uint n);\n/*\na : m_axi_gmem\nn : s_axi_control\n*/"
        );
        assert_eq!(kernel.register_args().count(), 2);
        assert_eq!(kernel.stream_args().count(), 0);
    }
}
