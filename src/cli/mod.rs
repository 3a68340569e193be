pub mod completions;
pub mod regions;
pub mod split;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, ConfigOverrides};
use crate::error::Result;
use crate::project::{load_manifest, Manifest};

/// pxsplit - Split a sprite layer into one layer per opaque region
#[derive(Parser, Debug)]
#[command(name = "pxsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show every pipeline step
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split images into one PNG per opaque region
    Split(split::SplitArgs),

    /// List the regions an image would be split into
    Regions(regions::RegionsArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Split options shared by commands.
#[derive(Args, Debug, Clone, Default)]
pub struct SplitOptions {
    /// Grow the opaque selection by half this many pixels
    #[arg(long)]
    pub tolerance: Option<u32>,

    /// Text between the source name and the index
    #[arg(long)]
    pub suffix: Option<String>,

    /// Do not append a running index to output names
    #[arg(long)]
    pub no_count: bool,

    /// Pixels of padding around each region
    #[arg(long)]
    pub padding: Option<u32>,

    /// Config file (default: pxsplit.yaml in the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SplitOptions {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            tolerance: self.tolerance,
            suffix: self.suffix.clone(),
            add_count: self.no_count.then_some(false),
            padding: self.padding,
            confirm_threshold: None,
        }
    }

    /// Resolve the manifest and the effective split config.
    ///
    /// An explicit `--config` file holds split options only; otherwise the
    /// project manifest in `dir` is used.
    pub fn resolve(&self, dir: &Path) -> Result<(Manifest, Config)> {
        let manifest = match &self.config {
            Some(path) => Manifest {
                split: Config::load(path)?,
                ..Default::default()
            },
            None => load_manifest(dir)?,
        };
        let config = manifest.split.with_overrides(&self.overrides());
        Ok((manifest, config))
    }
}
