use argh::FromArgs;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use poi::imgproc::features::{HarrisConfig, HarrisDetector, InterestPoint, WindowSum};
use poi::io::functional as F;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Detect Harris points of interest on an image or a directory of images.
#[derive(FromArgs)]
struct Args {
    /// path to an image file or a directory of images
    #[argh(option)]
    input: PathBuf,

    /// path of the JSON file the points are written to
    #[argh(option)]
    output: PathBuf,

    /// process at most this many images of a directory
    #[argh(option)]
    max_images: Option<usize>,

    /// JSON file with the detector parameters
    #[argh(option)]
    config: Option<PathBuf>,

    /// sensitivity constant of the corner response
    #[argh(option)]
    k: Option<f64>,

    /// side of the square window, a positive odd number
    #[argh(option)]
    window_size: Option<usize>,

    /// report the pixels whose response is strictly above this value
    #[argh(option)]
    threshold: Option<f64>,

    /// keep only the local maxima within this radius
    #[argh(option)]
    nms_radius: Option<usize>,

    /// sum the windows with summed-area tables
    #[argh(switch)]
    integral: bool,

    /// number of threads used to process the images
    #[argh(option)]
    num_threads: Option<usize>,
}

#[derive(Debug, Serialize)]
struct Detection {
    points_of_interest: Vec<InterestPoint>,
}

fn build_config(args: &Args) -> Result<HarrisConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => HarrisConfig::default(),
    };

    if let Some(k) = args.k {
        config = config.with_k(k);
    }
    if let Some(window_size) = args.window_size {
        config = config.with_window_size(window_size);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }
    if let Some(radius) = args.nms_radius {
        config = config.with_nms_radius(radius);
    }
    if args.integral {
        config = config.with_window_sum(WindowSum::Integral);
    }

    Ok(config)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// The image files under `dir`, sorted by path.
fn collect_images(dir: &Path, max_images: Option<usize>) -> Vec<PathBuf> {
    let mut images_paths = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_image(entry.path()))
        .map(|entry| entry.path().to_path_buf())
        .collect::<Vec<_>>();

    images_paths.sort();
    if let Some(max_images) = max_images {
        images_paths.truncate(max_images);
    }

    images_paths
}

fn detect_file(detector: &HarrisDetector, path: &Path) -> Result<Detection, BoxError> {
    let gray = F::read_image_gray8(path)?;
    let points_of_interest = detector.detect(&gray)?;
    Ok(Detection { points_of_interest })
}

fn detect_dir(
    detector: &HarrisDetector,
    dir: &Path,
    max_images: Option<usize>,
) -> Result<BTreeMap<String, Detection>, Box<dyn std::error::Error>> {
    let images_paths = collect_images(dir, max_images);

    if images_paths.is_empty() {
        log::warn!("No images found in {}", dir.display());
        return Ok(BTreeMap::new());
    }

    log::info!("Found {} images in {}", images_paths.len(), dir.display());

    let pb = indicatif::ProgressBar::new(images_paths.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta}) {msg} {per_sec}",
            )?
            .progress_chars("##>-"),
    );

    let results = images_paths
        .into_par_iter()
        .progress_with(pb)
        .filter_map(|path| {
            let key = path
                .strip_prefix(dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();

            match detect_file(detector, &path) {
                Ok(detection) => {
                    log::debug!(
                        "{key}: {} points of interest",
                        detection.points_of_interest.len()
                    );
                    Some((key, detection))
                }
                Err(err) => {
                    log::warn!("Skipping {}: {err}", path.display());
                    None
                }
            }
        })
        .collect::<BTreeMap<_, _>>();

    Ok(results)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer(file, value)?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()?;
    }

    let detector = HarrisDetector::new(build_config(&args)?)?;
    log::info!("Detecting with {:?}", detector.config());

    if args.input.is_dir() {
        let results = detect_dir(&detector, &args.input, args.max_images)?;
        log::info!("Processed {} images", results.len());
        write_json(&args.output, &results)?;
    } else {
        let detection = detect_file(&detector, &args.input)
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        log::info!(
            "Found {} points of interest in {}",
            detection.points_of_interest.len(),
            args.input.display()
        );
        write_json(&args.output, &detection)?;
    }

    log::info!("Results written to {}", args.output.display());

    Ok(())
}
