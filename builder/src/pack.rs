// Licensed under the Apache-2.0 license

//! Preparation of the `.xo` packaging directory for one HLS kernel.
//!
//! ```text
//! <build>/
//! ├── <kernel>/<kernel>/<kernel>/   # HLS solution (input)
//! │   └── kernel.xml
//! ├── <kernel>.xo                   # declared archive path (not created here)
//! └── pack/
//!     ├── src/                      # copy of the solution
//!     ├── debug/
//!     ├── pack_xo.tcl               # patched copy of the master template
//!     └── kernel_regs.tcl           # generated register map
//! ```

use crate::config::{PackConfig, MASTER_TEMPLATE};
use crate::error::{PackError, Result};
use crate::fs;
use crate::template::{patch, PatchRule, Template};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use xo_descriptor::KernelDescriptor;
use xo_regmap_generator::generate_register_map;

pub const PACK_DIR: &str = "pack";
pub const REGISTER_SCRIPT: &str = "kernel_regs.tcl";
pub const DESCRIPTOR_FILE: &str = "kernel.xml";

/// Groups of exported IP files the packaging script adds to the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceCategory {
    Hdl,
    Driver,
    Subcore,
    Documentation,
    BlockDesign,
    Constraints,
    Misc,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 7] = [
        SourceCategory::Hdl,
        SourceCategory::Driver,
        SourceCategory::Subcore,
        SourceCategory::Documentation,
        SourceCategory::BlockDesign,
        SourceCategory::Constraints,
        SourceCategory::Misc,
    ];

    /// Name of the template variable holding the category's files.
    pub fn setting(&self) -> &'static str {
        match self {
            SourceCategory::Hdl => "hdl_files",
            SourceCategory::Driver => "driver_files",
            SourceCategory::Subcore => "subcore_files",
            SourceCategory::Documentation => "doc_files",
            SourceCategory::BlockDesign => "bd_files",
            SourceCategory::Constraints => "constraint_files",
            SourceCategory::Misc => "misc_files",
        }
    }

    /// Glob relative to the exported IP directory.
    pub fn glob(&self) -> &'static str {
        match self {
            SourceCategory::Hdl => "hdl/verilog/*",
            SourceCategory::Driver => "drivers/*",
            SourceCategory::Subcore => "hdl/ip/*",
            SourceCategory::Documentation => "doc/*",
            SourceCategory::BlockDesign => "bd/*",
            SourceCategory::Constraints => "constraints/*",
            SourceCategory::Misc => "misc/*",
        }
    }
}

/// Absolute paths of everything a packaging run reads or writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackLayout {
    pub kernel_name: String,
    pub build_dir: PathBuf,
    /// HLS solution the kernel was synthesized into.
    pub solution_dir: PathBuf,
    pub pack_dir: PathBuf,
    /// Copy of the solution inside the pack directory.
    pub source_dir: PathBuf,
    pub descriptor: PathBuf,
    pub ip_dir: PathBuf,
    pub debug_dir: PathBuf,
    pub template: PathBuf,
    pub register_script: PathBuf,
    pub xo_path: PathBuf,
}

impl PackLayout {
    pub fn new(build_dir: &Path, kernel_name: &str) -> Result<Self> {
        let build_dir =
            std::path::absolute(build_dir).map_err(PackError::io("resolve", build_dir))?;
        let solution_dir = build_dir.join(kernel_name).join(kernel_name).join(kernel_name);
        let pack_dir = build_dir.join(PACK_DIR);
        let source_dir = pack_dir.join("src");
        let template_name = Path::new(MASTER_TEMPLATE)
            .file_name()
            .unwrap_or_default();
        Ok(Self {
            kernel_name: kernel_name.to_string(),
            descriptor: source_dir.join(DESCRIPTOR_FILE),
            ip_dir: source_dir.join("impl").join("ip"),
            debug_dir: pack_dir.join("debug"),
            template: pack_dir.join(template_name),
            register_script: pack_dir.join(REGISTER_SCRIPT),
            xo_path: build_dir.join(format!("{kernel_name}.xo")),
            solution_dir,
            source_dir,
            pack_dir,
            build_dir,
        })
    }

    /// Rewrite rules pointing the master template at this layout.
    pub fn patch_rules(&self) -> Vec<PatchRule> {
        let quoted = |path: &Path| tcl_quote(&path.display().to_string());
        let mut rules = vec![
            PatchRule::setting("kernel_xml", &quoted(&self.descriptor)),
            PatchRule::setting("solution_dir", &quoted(&self.source_dir)),
            PatchRule::setting("debug_dir", &quoted(&self.debug_dir)),
            PatchRule::setting("xo_path", &quoted(&self.xo_path)),
        ];
        for category in SourceCategory::ALL {
            let pattern = format!(
                "{}/{}",
                glob_escape(&self.ip_dir.display().to_string()),
                category.glob()
            );
            rules.push(PatchRule::setting(
                category.setting(),
                &format!("[glob -nocomplain {}]", tcl_quote(&pattern)),
            ));
        }
        rules
    }
}

/// Wraps `text` in Tcl double quotes, escaping substitution characters.
fn tcl_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '\\' | '$' | '[' | ']' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Escapes the characters `glob` treats as pattern syntax.
fn glob_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '?' | '[' | ']' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Copies the HLS solution and master template into `<build_dir>/pack`,
/// generates the register-map script and patches the template copy.
///
/// On error the pack directory may be left partially populated.
pub fn prepare_pack_xo(
    build_dir: &Path,
    kernel_name: &str,
    config: &PackConfig,
) -> Result<PackLayout> {
    let root = config.resolved_scripts_root()?;
    let master = root.join(MASTER_TEMPLATE);
    let layout = PackLayout::new(build_dir, kernel_name)?;
    info!(
        "Preparing {} for packaging in {}",
        kernel_name,
        layout.pack_dir.display()
    );

    fs::create_dir_all(&layout.pack_dir)?;
    fs::create_dir_all(&layout.debug_dir)?;
    let copied = fs::copy_dir_all(&layout.solution_dir, &layout.source_dir)?;
    debug!(
        "Copied {} files from {}",
        copied,
        layout.solution_dir.display()
    );
    fs::copy_file(&master, &layout.template)?;

    let kernel = KernelDescriptor::from_file(&layout.descriptor)?;
    if kernel.name != kernel_name {
        warn!(
            "Descriptor {} names kernel {}, expected {}",
            layout.descriptor.display(),
            kernel.name,
            kernel_name
        );
    }

    let map = generate_register_map(&kernel, &config.register_map_config())?;
    fs::write(&layout.register_script, &map.to_tcl())?;
    info!(
        "Wrote {} register-map statements to {}",
        map.statements.len(),
        layout.register_script.display()
    );

    let template = Template::parse(&fs::read_to_string(&layout.template)?);
    let outcome = patch(&template, &layout.patch_rules());
    fs::write(&layout.template, &outcome.template.render())?;
    if !outcome.is_complete() {
        if config.strict_patch {
            return Err(PackError::IncompletePatch {
                path: layout.template.clone(),
                unsatisfied: outcome.unsatisfied,
            });
        }
        warn!(
            "{} left unpatched: {}",
            layout.template.display(),
            outcome.unsatisfied.join(", ")
        );
    }

    info!("Packaging script ready: {}", layout.template.display());
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = PackLayout::new(Path::new("/work/build"), "vvadd").unwrap();
        assert_eq!(layout.solution_dir, Path::new("/work/build/vvadd/vvadd/vvadd"));
        assert_eq!(layout.descriptor, Path::new("/work/build/pack/src/kernel.xml"));
        assert_eq!(layout.template, Path::new("/work/build/pack/pack_xo.tcl"));
        assert_eq!(layout.register_script, Path::new("/work/build/pack/kernel_regs.tcl"));
        assert_eq!(layout.xo_path, Path::new("/work/build/vvadd.xo"));
    }

    #[test]
    fn test_layout_is_absolute() {
        let layout = PackLayout::new(Path::new("relative/build"), "k").unwrap();
        assert!(layout.build_dir.is_absolute());
        assert!(layout.xo_path.is_absolute());
    }

    #[test]
    fn test_patch_rules() {
        let layout = PackLayout::new(Path::new("/work/build"), "vvadd").unwrap();
        let rules = layout.patch_rules();
        assert_eq!(rules.len(), 4 + SourceCategory::ALL.len());
        assert_eq!(
            rules[0].replacement,
            "set kernel_xml \"/work/build/pack/src/kernel.xml\""
        );
        let hdl = rules.iter().find(|r| r.pattern == "set hdl_files ").unwrap();
        assert_eq!(
            hdl.replacement,
            "set hdl_files [glob -nocomplain \"/work/build/pack/src/impl/ip/hdl/verilog/*\"]"
        );
    }

    #[test]
    fn test_patch_rules_escape_tcl_metacharacters() {
        let layout = PackLayout::new(Path::new("/work/$x [y]"), "vvadd").unwrap();
        let rules = layout.patch_rules();
        assert_eq!(
            rules[0].replacement,
            r#"set kernel_xml "/work/\$x \[y\]/pack/src/kernel.xml""#
        );
        let hdl = rules.iter().find(|r| r.pattern == "set hdl_files ").unwrap();
        assert_eq!(
            hdl.replacement,
            r#"set hdl_files [glob -nocomplain "/work/\$x \\\[y\\\]/pack/src/impl/ip/hdl/verilog/*"]"#
        );
    }

    #[test]
    fn test_tcl_quote_escapes_quotes_and_backslashes() {
        assert_eq!(tcl_quote(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(glob_escape("d*{e}?"), r"d\*\{e\}\?");
    }
}
