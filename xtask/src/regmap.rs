// Licensed under the Apache-2.0 license

//! Stand-alone register-map generation, without preparing a pack directory.

use anyhow::{Context, Result};
use std::path::Path;
use xo_descriptor::KernelDescriptor;
use xo_regmap_generator::{generate_register_map, RegisterMapConfig};

pub fn generate(xml: &Path, output: Option<&Path>, clock: &str) -> Result<()> {
    let kernel = KernelDescriptor::from_file(xml)?;
    let map = generate_register_map(&kernel, &RegisterMapConfig::default().clock(clock))?;
    let tcl = map.to_tcl();

    if let Some(output_path) = output {
        std::fs::write(output_path, &tcl)
            .with_context(|| format!("writing {}", output_path.display()))?;
        println!("Output written to: {}", output_path.display());
    } else {
        print!("{tcl}");
    }
    Ok(())
}
