//! Split command implementation.
//!
//! Loads each PNG as a one-layer document, splits it into region layers and
//! writes every layer as a cropped PNG plus a JSON description.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::Config;
use crate::error::{Result, SplitError};
use crate::export::{export_report, meta_path, write_split_json, SplitMeta};
use crate::host::RasterHost;
use crate::output::{display_path, plural, Printer};
use crate::project::scan_inputs;
use crate::split::{preview_regions, split_layer};

use super::SplitOptions;

/// Split images into one PNG per opaque region
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// PNG files or directories to split
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub options: SplitOptions,

    /// Output directory (default: from pxsplit.yaml, else "dist")
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Split even when the region count exceeds confirmThreshold
    #[arg(long, short)]
    pub yes: bool,
}

pub fn run(args: SplitArgs, printer: &Printer) -> Result<()> {
    let (manifest, config) = args.options.resolve(Path::new("."))?;
    let output = args.output.clone().unwrap_or_else(|| manifest.output.clone());

    let files = scan_inputs(&args.inputs, &manifest);
    if files.is_empty() {
        return Err(SplitError::Io {
            path: args.inputs[0].clone(),
            message: "No PNG files found".to_string(),
        });
    }

    let mut first_error = None;
    let mut total_layers = 0;
    let mut split_images = 0;

    for file in &files {
        match split_file(file, &config, &output, args.yes, printer) {
            Ok(meta) => {
                total_layers += meta.regions.len();
                split_images += 1;
            }
            Err(e) => {
                printer.error("Failed", &format!("{}: {}", display_path(file), e));
                first_error.get_or_insert(e);
            }
        }
    }

    if split_images > 0 {
        printer.success(
            "Wrote",
            &format!(
                "{} from {} to {}",
                plural(total_layers, "layer", "layers"),
                plural(split_images, "image", "images"),
                display_path(&output)
            ),
        );
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Split one image and export its layers.
fn split_file(
    path: &Path,
    config: &Config,
    output: &Path,
    yes: bool,
    printer: &Printer,
) -> Result<SplitMeta> {
    let display = display_path(path);
    if !path.exists() {
        return Err(SplitError::Io {
            path: path.to_path_buf(),
            message: format!("File not found: {}", display),
        });
    }

    printer.status("Loading", &display);
    let mut host = RasterHost::open(path)?;

    let regions = preview_regions(&mut host, config, printer)?;
    if config.exceeds_threshold(regions.len()) {
        if !yes {
            return Err(SplitError::Config {
                message: format!(
                    "{} would produce {} (confirm threshold is {})",
                    display,
                    plural(regions.len(), "layer", "layers"),
                    config.confirm_threshold
                ),
                help: Some(
                    "Pass --yes to split anyway, or raise confirmThreshold in pxsplit.yaml"
                        .to_string(),
                ),
            });
        }
        printer.warning(
            "Warning",
            &format!("creating {}", plural(regions.len(), "layer", "layers")),
        );
    }

    printer.status("Splitting", &format!("{} ({})", display, plural(regions.len(), "region", "regions")));
    let report = split_layer(&mut host, config, printer)?;

    let meta = export_report(&host, &report, output)?;
    write_split_json(&meta, &meta_path(output, &report.source.name))?;
    Ok(meta)
}
