// Licensed under the Apache-2.0 license

//! Deserialization of `kernel.xml` into the typed model.
//!
//! The document is first read into attribute-only "raw" records with
//! quick-xml, then every attribute is validated and converted. Keeping the
//! two steps apart lets each error name the element and attribute it came
//! from instead of a serde field path.

use crate::error::{DescriptorError, Result};
use crate::model::{
    AddressQualifier, Argument, ControlProtocol, KernelDescriptor, Port, PortKind, PortMode,
    RESERVED_REGISTER_BYTES,
};
use crate::util::{parse_bool, parse_decimal, parse_hex};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Deserialize)]
struct RawRoot {
    kernel: Option<RawKernel>,
}

#[derive(Deserialize)]
struct RawKernel {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@hwControlProtocol")]
    hw_control_protocol: Option<String>,
    #[serde(rename = "@interrupt")]
    interrupt: Option<String>,
    ports: Option<RawPorts>,
    args: Option<RawArgs>,
}

#[derive(Deserialize, Default)]
struct RawPorts {
    #[serde(rename = "port", default)]
    port: Vec<RawPort>,
}

#[derive(Deserialize)]
struct RawPort {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@mode")]
    mode: Option<String>,
    #[serde(rename = "@portType")]
    port_type: Option<String>,
    #[serde(rename = "@dataWidth")]
    data_width: Option<String>,
    #[serde(rename = "@base")]
    base: Option<String>,
    #[serde(rename = "@range")]
    range: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawArgs {
    #[serde(rename = "arg", default)]
    arg: Vec<RawArg>,
}

#[derive(Deserialize)]
struct RawArg {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@type")]
    typ: Option<String>,
    #[serde(rename = "@addressQualifier")]
    address_qualifier: Option<String>,
    #[serde(rename = "@port")]
    port: Option<String>,
    #[serde(rename = "@size")]
    size: Option<String>,
    #[serde(rename = "@offset")]
    offset: Option<String>,
}

/// Returns the attribute value, treating an empty attribute as missing.
fn required<'a>(element: &str, attribute: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DescriptorError::malformed(element, attribute, "is missing")),
    }
}

fn convert<T>(
    element: &str,
    attribute: &str,
    value: &str,
    parse: impl FnOnce(&str) -> std::result::Result<T, String>,
) -> Result<T> {
    parse(value).map_err(|reason| DescriptorError::malformed(element, attribute, reason))
}

fn one_of<T>(
    element: &str,
    attribute: &str,
    value: &str,
    parse: impl FnOnce(&str) -> Option<T>,
    accepted: &str,
) -> Result<T> {
    parse(value).ok_or_else(|| {
        DescriptorError::malformed(
            element,
            attribute,
            format!("has unsupported value {value:?} (expected {accepted})"),
        )
    })
}

fn element_label(tag: &str, name: Option<&str>, index: usize) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("<{tag} name=\"{name}\">"),
        _ => format!("<{tag}> #{index}"),
    }
}

impl RawPort {
    fn into_port(self, index: usize) -> Result<Port> {
        let element = element_label("port", self.name.as_deref(), index);
        let name = required(&element, "name", &self.name)?.to_string();
        let mode = one_of(
            &element,
            "mode",
            required(&element, "mode", &self.mode)?,
            PortMode::parse,
            "master, slave, read_only, write_only or read_write",
        )?;
        let kind = one_of(
            &element,
            "portType",
            required(&element, "portType", &self.port_type)?,
            PortKind::parse,
            "addressable or stream",
        )?;
        let data_width = convert(
            &element,
            "dataWidth",
            required(&element, "dataWidth", &self.data_width)?,
            parse_decimal,
        )?;

        // Stream ports carry no address window; kernel.xml usually omits both fields.
        let (base, range) = match kind {
            PortKind::Addressable => {
                let base = convert(
                    &element,
                    "base",
                    required(&element, "base", &self.base)?,
                    parse_hex,
                )?;
                let range = convert(
                    &element,
                    "range",
                    required(&element, "range", &self.range)?,
                    parse_hex,
                )?;
                if base > range {
                    return Err(DescriptorError::malformed(
                        &element,
                        "base",
                        format!("{base:#x} lies above range {range:#x}"),
                    ));
                }
                (base, range)
            }
            PortKind::Stream => {
                let optional_hex = |attribute: &str, value: &Option<String>| match value.as_deref()
                {
                    Some(v) if !v.trim().is_empty() => convert(&element, attribute, v, parse_hex),
                    _ => Ok(0),
                };
                (
                    optional_hex("base", &self.base)?,
                    optional_hex("range", &self.range)?,
                )
            }
        };

        Ok(Port {
            name,
            mode,
            kind,
            data_width,
            base,
            range,
        })
    }
}

impl RawArg {
    fn into_argument(self, index: usize, ports: &BTreeMap<String, Port>) -> Result<Argument> {
        let element = element_label("arg", self.name.as_deref(), index);
        let name = required(&element, "name", &self.name)?.to_string();
        let declared_type = required(&element, "type", &self.typ)?.to_string();
        let qualifier = one_of(
            &element,
            "addressQualifier",
            required(&element, "addressQualifier", &self.address_qualifier)?,
            AddressQualifier::parse,
            "0, 1 or 4",
        )?;
        let port_name = required(&element, "port", &self.port)?.to_string();
        let size = convert(
            &element,
            "size",
            required(&element, "size", &self.size)?,
            parse_hex,
        )?;
        if size.checked_mul(8).is_none() {
            return Err(DescriptorError::malformed(
                &element,
                "size",
                format!("{size:#x} bytes is too wide for a register"),
            ));
        }
        let offset = convert(
            &element,
            "offset",
            required(&element, "offset", &self.offset)?,
            parse_hex,
        )?;

        let port = ports
            .get(&port_name)
            .ok_or_else(|| DescriptorError::UnresolvedPort {
                arg: name.clone(),
                port: port_name.clone(),
            })?;

        Ok(Argument {
            is_pointer: qualifier == AddressQualifier::Pointer,
            is_stream: qualifier == AddressQualifier::Stream || port.kind == PortKind::Stream,
            name,
            declared_type,
            port_name,
            size,
            offset,
        })
    }
}

/// Checks that no two register windows overlap, including the reserved
/// control registers when the kernel has a control block.
fn check_register_windows(
    protocol: ControlProtocol,
    args: &[Argument],
) -> Result<()> {
    let mut windows: Vec<(u64, u64, &str)> = Vec::new();
    if protocol.has_control_block() {
        windows.push((0, RESERVED_REGISTER_BYTES, "reserved control registers"));
    }
    for arg in args.iter().filter(|arg| arg.has_register() && arg.size > 0) {
        let end = arg.offset.checked_add(arg.size).ok_or_else(|| {
            DescriptorError::malformed(
                element_label("arg", Some(&arg.name), 0),
                "size",
                "window extends past the end of the address space",
            )
        })?;
        windows.push((arg.offset, end, &arg.name));
    }
    windows.sort_by_key(|(start, end, _)| (*start, *end));

    for pair in windows.windows(2) {
        let (start_a, end_a, name_a) = pair[0];
        let (start_b, end_b, name_b) = pair[1];
        if start_b < end_a {
            return Err(DescriptorError::malformed(
                element_label("arg", Some(name_b), 0),
                "offset",
                format!(
                    "window [{start_b:#x}, {end_b:#x}) overlaps {name_a} [{start_a:#x}, {end_a:#x})"
                ),
            ));
        }
    }
    Ok(())
}

impl KernelDescriptor {
    /// Parses the text of a `kernel.xml` document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: RawRoot = quick_xml::de::from_str(xml)?;
        let kernel = root
            .kernel
            .ok_or_else(|| DescriptorError::malformed("<root>", "kernel", "element is missing"))?;

        let element = element_label("kernel", kernel.name.as_deref(), 0);
        let name = required(&element, "name", &kernel.name)?.to_string();
        let control_protocol = one_of(
            &element,
            "hwControlProtocol",
            required(&element, "hwControlProtocol", &kernel.hw_control_protocol)?,
            ControlProtocol::parse,
            "ap_ctrl_hs, ap_ctrl_chain, ap_ctrl_none or user_managed",
        )?;
        let uses_interrupt = convert(
            &element,
            "interrupt",
            required(&element, "interrupt", &kernel.interrupt)?,
            parse_bool,
        )?;

        let raw_ports = kernel
            .ports
            .ok_or_else(|| DescriptorError::malformed(&element, "ports", "element is missing"))?;
        let raw_args = kernel
            .args
            .ok_or_else(|| DescriptorError::malformed(&element, "args", "element is missing"))?;

        let mut ports = BTreeMap::new();
        for (index, raw) in raw_ports.port.into_iter().enumerate() {
            let port = raw.into_port(index)?;
            if ports.contains_key(&port.name) {
                return Err(DescriptorError::malformed(
                    element_label("port", Some(&port.name), index),
                    "name",
                    "duplicates an earlier port",
                ));
            }
            ports.insert(port.name.clone(), port);
        }

        let args = raw_args
            .arg
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.into_argument(index, &ports))
            .collect::<Result<Vec<_>>>()?;

        check_register_windows(control_protocol, &args)?;

        debug!(
            "Parsed kernel {} ({}): {} ports, {} args",
            name,
            control_protocol,
            ports.len(),
            args.len()
        );

        Ok(KernelDescriptor {
            name,
            control_protocol,
            uses_interrupt,
            ports,
            args,
        })
    }

    /// Reads and parses a `kernel.xml` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_xml(&xml)
    }
}

impl FromStr for KernelDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_xml(s)
    }
}
