use log::*;
use pano::pointclouds::export_ply;
use pano::visibility::{AnnotationVisibility, FileFetcher, VisibilitySettings};
use pano::{Dataset, FeatureRef};
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

/// A `<point cloud>:<vertex>` feature reference given on the command line.
#[derive(Debug, Clone, Copy)]
struct FeatureArg(FeatureRef);

impl FromStr for FeatureArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (point_cloud, vertex) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <point cloud>:<vertex>, got {}", s))?;
        let point_cloud = point_cloud.parse().map_err(|e| format!("{}: {}", s, e))?;
        let vertex = vertex.parse().map_err(|e| format!("{}: {}", s, e))?;
        Ok(FeatureArg(FeatureRef::new(point_cloud, vertex)))
    }
}

#[derive(StructOpt, Clone)]
#[structopt(
    name = "visibility-sandbox",
    about = "A tool for checking annotation visibility on a capture"
)]
struct Opt {
    /// The dataset metadata file.
    ///
    /// This is in the format of `pano::Dataset`.
    #[structopt(short, long, default_value = "dataset.json")]
    dataset: PathBuf,
    /// The file where settings are specified.
    ///
    /// This is in the format of `pano::visibility::VisibilitySettings`.
    #[structopt(short, long, default_value = "visibility-settings.json")]
    settings: PathBuf,
    /// The directory holding the track files `0.bin`, `1.bin`, ...
    #[structopt(short, long, default_value = "tracks")]
    point_clouds: String,
    /// The number of track files. Zero uses the path heuristic.
    #[structopt(short = "n", long, default_value = "0")]
    count: usize,
    /// The structural index of the camera on screen
    #[structopt(short, long, default_value = "0")]
    camera: usize,
    /// Features of the annotation, as `<point cloud>:<vertex>`.
    ///
    /// Defaults to every feature seen from the camera.
    #[structopt(short, long)]
    feature: Vec<FeatureArg>,
    /// Output PLY file to deposit the first point cloud, with the camera's vertices highlighted
    #[structopt(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    info!("loading dataset {}", opt.dataset.display());
    let dataset: Dataset = std::fs::File::open(&opt.dataset)
        .map_err(|e| e.to_string())
        .and_then(|file| serde_json::from_reader(file).map_err(|e| e.to_string()))
        .unwrap_or_else(|e| {
            error!("unable to load dataset {}: {}", opt.dataset.display(), e);
            std::process::exit(1);
        });

    let settings = std::fs::File::open(&opt.settings)
        .ok()
        .and_then(|file| serde_json::from_reader(file).ok());
    if settings.is_some() {
        info!("loaded existing settings");
    } else {
        info!("used default settings");
    }
    let settings: VisibilitySettings = settings.unwrap_or_default();

    let (visibility, report) = AnnotationVisibility::init(
        &dataset,
        FileFetcher::new(),
        &opt.point_clouds,
        opt.count,
        settings,
    );
    for (index, e) in &report.failures {
        warn!("point cloud {} unavailable: {}", index, e);
    }

    let camera = match dataset.camera(opt.camera) {
        Some(camera) => *camera,
        None => {
            error!(
                "camera {} does not exist, the dataset has {} cameras",
                opt.camera,
                dataset.cameras.len()
            );
            std::process::exit(1);
        }
    };

    let visible_features = visibility.visible_features(opt.camera);
    println!(
        "camera {} (image {}, path index {}) sees {} features",
        opt.camera,
        camera.index,
        camera.q_index,
        visible_features.len()
    );
    for feature in &visible_features {
        let (x, y, z, point_cloud, vertex) = feature.to_tuple();
        debug!("{}:{} at ({}, {}, {})", point_cloud, vertex, x, y, z);
    }

    let features: Vec<FeatureRef> = if opt.feature.is_empty() {
        visible_features.iter().map(|feature| **feature).collect()
    } else {
        opt.feature.iter().map(|&FeatureArg(feature)| feature).collect()
    };
    let cameras = visibility.visible_cameras(opt.camera, &features);
    println!(
        "visible from {} cameras ({}): {:?}",
        cameras.len(),
        if visibility.is_exact() {
            "point clouds"
        } else {
            "path heuristic"
        },
        cameras
    );

    if let Some(path) = opt.output {
        let point_cloud = match &visibility {
            AnnotationVisibility::PointCloud { index, .. } => {
                index.point_clouds().next().map(|(_, point_cloud)| point_cloud)
            }
            AnnotationVisibility::Fallback(_) => None,
        };
        match point_cloud {
            Some(point_cloud) => {
                info!("exporting point cloud to {}", path.display());
                let result = std::fs::File::create(&path)
                    .and_then(|file| export_ply(file, point_cloud, Some(camera.index)));
                if let Err(e) = result {
                    error!("unable to export point cloud: {}", e);
                }
            }
            None => warn!("no point cloud loaded, nothing to export"),
        }
    }
}
