// Licensed under the Apache-2.0 license

use anyhow::{Context, Result};
use std::path::Path;
use xo_builder::{prepare_pack_xo, PackConfig};

/// Prepare `<build_dir>/pack` for the `.xo` packaging step.
pub fn pack_xo(
    build_dir: &Path,
    kernel: &str,
    svpp_root: Option<&Path>,
    config_file: Option<&Path>,
    allow_incomplete_patch: bool,
) -> Result<()> {
    let mut config = match config_file {
        Some(path) => PackConfig::from_file(path)?,
        None => PackConfig::default(),
    };
    // The command line (or SVPP_ROOT) wins over the config file.
    if let Some(root) = svpp_root {
        config = config.scripts_root(root);
    }
    if allow_incomplete_patch {
        config = config.strict_patch(false);
    }

    let layout = prepare_pack_xo(build_dir, kernel, &config)
        .with_context(|| format!("preparing kernel {kernel} for packaging"))?;

    println!("Pack directory:     {}", layout.pack_dir.display());
    println!("Packaging script:   {}", layout.template.display());
    println!("Register map:       {}", layout.register_script.display());
    println!("Archive (to build): {}", layout.xo_path.display());
    Ok(())
}
