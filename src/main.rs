use anyhow::{anyhow, Context, Result};
use class_names::ClassNames;
use frame::Frame;
use normalize::NormalizeShape;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

mod class_names;
mod compare;
mod error;
mod extract;
mod feedback;
mod frame;
mod normalize;
mod pose;
mod similarity;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown output format: {}", other)),
        }
    }
}

/// Compare annotated and detected person keypoints from labelme json files.
#[derive(structopt::StructOpt)]
struct Opt {
    /// Annotated (ground truth) labelme json file.
    #[structopt(long)]
    annotate_json: PathBuf,

    /// Detection result labelme json file.
    #[structopt(long)]
    detect_json: PathBuf,

    /// Keypoint class names, one per line.
    #[structopt(long, default_value = "configs/mpii_classes.txt")]
    classes_path: PathBuf,

    /// Normalized person area shape as <height>x<width>.
    #[structopt(long, default_value = "256x256")]
    normalize_shape: NormalizeShape,

    /// Report format: text or json.
    #[structopt(long, default_value = "text", possible_values = &["text", "json"])]
    format: OutputFormat,

    #[structopt(short, long, default_value = "warn", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(flatten)]
    thresholds: compare::Thresholds,
}

/// Load both frames and the class list, then compare them.
fn compare_files(
    annotate_json: &Path,
    detect_json: &Path,
    classes_path: &Path,
    normalize_shape: NormalizeShape,
    thresholds: &compare::Thresholds,
) -> Result<compare::Report> {
    let class_names = ClassNames::from_path(classes_path)
        .with_context(|| format!("failed loading class names from {:?}", classes_path))?;
    let annotation = Frame::from_path(annotate_json)
        .with_context(|| format!("failed loading annotation {:?}", annotate_json))?;
    let detection = Frame::from_path(detect_json)
        .with_context(|| format!("failed loading detection {:?}", detect_json))?;

    info!(
        message = "comparing keypoints",
        annotation = ?annotate_json,
        detection = ?detect_json,
        normalize_shape = %normalize_shape,
        keypoints = class_names.len(),
    );

    compare::evaluate(
        &annotation,
        &detection,
        &class_names[..],
        normalize_shape,
        thresholds,
    )
    .context("failed comparing keypoints")
}

fn main() -> Result<()> {
    let Opt {
        annotate_json,
        detect_json,
        classes_path,
        normalize_shape,
        format,
        log_level,
        thresholds,
    } = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(log_level),
    )?;

    let report = compare_files(
        &annotate_json,
        &detect_json,
        &classes_path,
        normalize_shape,
        &thresholds,
    )?;

    match format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed serializing report")?
        ),
    }
    Ok(())
}
