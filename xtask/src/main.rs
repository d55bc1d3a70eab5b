// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod kernel_info;
mod pack_xo;
mod regmap;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Xtask {
    #[command(subcommand)]
    xtask: Commands,

    /// Print debug messages
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare an HLS kernel for packaging into a .xo archive
    PackXo {
        /// HLS build directory containing <kernel>/<kernel>/<kernel>
        #[arg(long)]
        build_dir: PathBuf,

        /// Kernel name
        #[arg(long)]
        kernel: String,

        /// Root of the svpp repository holding scripts/pack_xo.tcl
        #[arg(long, env = "SVPP_ROOT")]
        svpp_root: Option<PathBuf>,

        /// TOML file with packaging settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Warn instead of failing when a template setting is not found
        #[arg(long, default_value_t = false)]
        allow_incomplete_patch: bool,
    },

    /// Print the signature and port map described by a kernel.xml
    KernelInfo {
        /// Path to kernel.xml
        xml: PathBuf,
    },

    /// Generate the register-map script for a kernel.xml
    Regmap {
        /// Path to kernel.xml
        xml: PathBuf,

        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Clock the bus interfaces are associated with
        #[arg(long, default_value = "ap_clk")]
        clock: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Xtask::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    match &cli.xtask {
        Commands::PackXo {
            build_dir,
            kernel,
            svpp_root,
            config,
            allow_incomplete_patch,
        } => pack_xo::pack_xo(
            build_dir,
            kernel,
            svpp_root.as_deref(),
            config.as_deref(),
            *allow_incomplete_patch,
        ),
        Commands::KernelInfo { xml } => kernel_info::kernel_info(xml),
        Commands::Regmap { xml, output, clock } => {
            regmap::generate(xml, output.as_deref(), clock)
        }
    }
}
