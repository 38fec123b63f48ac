use std::sync::Arc;

use clap::Parser;
use image::{DynamicImage, ImageReader};
use log::info;
use tracking_frame::config::CameraConfig;
use tracking_frame::io::object_from_json;
use tracking_frame::{Frame, RecordedExtractor, TrackingSession};

#[derive(Parser)]
#[command(version, about = "Build a frame from recorded detections and query its feature grid")]
struct FrameQueryCli {
    /// camera json: {fx, fy, cx, cy, width, height, distortion}
    #[arg(long)]
    camera: String,

    /// detections json: {n_levels, scale_factor, keypoints, descriptors}
    #[arg(long)]
    detections: String,

    /// image the detections belong to; only its size is used
    #[arg(long)]
    image: Option<String>,

    /// image width when no image is given, defaults to the camera width
    #[arg(long)]
    width: Option<u32>,

    /// image height when no image is given, defaults to the camera height
    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    x: f32,

    #[arg(long)]
    y: f32,

    #[arg(long, default_value = "10.0")]
    radius: f32,

    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    min_level: i32,

    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    max_level: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = FrameQueryCli::parse();

    let camera_config: CameraConfig = object_from_json(&cli.camera)?;
    let mut extractor: RecordedExtractor = object_from_json(&cli.detections)?;

    let image = match &cli.image {
        Some(path) => ImageReader::open(path)?.decode()?,
        None => DynamicImage::new_luma8(
            cli.width.unwrap_or(camera_config.width),
            cli.height.unwrap_or(camera_config.height),
        ),
    };

    let session = TrackingSession::new();
    let camera = Arc::new(camera_config.to_camera());
    let frame = Frame::new(&session, camera, &image, 0.0, &mut extractor)?;
    info!("{:?}", frame);

    let indices = frame.features_in_area(cli.x, cli.y, cli.radius, cli.min_level, cli.max_level);
    let bounds = frame.calibration().bounds();
    let matches: Vec<_> = indices
        .iter()
        .filter_map(|&i| frame.feature(i).map(|f| (i, f)))
        .map(|(i, f)| {
            serde_json::json!({
                "index": i,
                "x": f.undistorted.x(),
                "y": f.undistorted.y(),
                "octave": f.octave(),
            })
        })
        .collect();
    let summary = serde_json::json!({
        "frame_id": frame.id(),
        "num_keypoints": frame.num_keypoints(),
        "bounds": [bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y],
        "matches": matches,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
