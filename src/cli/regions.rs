//! Regions command implementation.
//!
//! Dry run: reports the bounds a split would use without creating layers.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::error::{Result, SplitError};
use crate::host::RasterHost;
use crate::output::{display_path, plural, Printer};
use crate::split::{output_layer_name, preview_regions, RegionBounds};

use super::SplitOptions;

/// List the regions an image would be split into
#[derive(Args, Debug)]
pub struct RegionsArgs {
    /// PNG file to inspect
    #[arg(required = true)]
    pub input: PathBuf,

    #[command(flatten)]
    pub options: SplitOptions,

    /// Print regions as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RegionsArgs, printer: &Printer) -> Result<Vec<RegionBounds>> {
    let (_, config) = args.options.resolve(Path::new("."))?;
    let path = &args.input;

    if !path.exists() {
        return Err(SplitError::Io {
            path: path.clone(),
            message: format!("File not found: {}", display_path(path)),
        });
    }

    let mut host = RasterHost::open(path)?;
    let source = host
        .layers()
        .into_iter()
        .next()
        .map(|l| l.name)
        .unwrap_or_default();
    let regions = preview_regions(&mut host, &config, printer)?;

    if args.json {
        let json = serde_json::to_string_pretty(&regions).map_err(|e| SplitError::Io {
            path: path.clone(),
            message: format!("Failed to serialize regions: {}", e),
        })?;
        println!("{}", json);
    } else {
        for (i, region) in regions.iter().enumerate() {
            let name = output_layer_name(&source, &config, i + 1);
            printer.info(
                "Region",
                &format!("{} {}", name, printer.dim(&region.rect().to_string())),
            );
        }
        printer.status(
            "Found",
            &format!("{} in {}", plural(regions.len(), "region", "regions"), display_path(path)),
        );
    }

    if config.exceeds_threshold(regions.len()) {
        printer.warning(
            "Warning",
            &format!(
                "more than {} regions; `pxsplit split` will ask for --yes",
                config.confirm_threshold
            ),
        );
    }

    Ok(regions)
}
