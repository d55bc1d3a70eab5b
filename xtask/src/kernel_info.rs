// Licensed under the Apache-2.0 license

use anyhow::Result;
use std::path::Path;
use xo_descriptor::KernelDescriptor;

pub fn kernel_info(xml: &Path) -> Result<()> {
    let kernel = KernelDescriptor::from_file(xml)?;
    println!("{kernel}");
    println!(
        "// protocol: {}, interrupt: {}",
        kernel.control_protocol, kernel.uses_interrupt
    );
    for port in kernel.ports.values() {
        println!(
            "// port {port}: {} bits @ {:#x}..{:#x}",
            port.data_width, port.base, port.range
        );
    }
    Ok(())
}
