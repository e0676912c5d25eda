use clap::{Args, Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use vertebrae_counter::annotation_view::view::AnnotationView;
use vertebrae_counter::annotations::render_box::RenderBox;
use vertebrae_counter::config::AppConfig;
use vertebrae_counter::detection_client::http_client::HttpDetectionClient;
use vertebrae_counter::error::AppError;
use vertebrae_counter::evaluation::report::{
    EvaluationOptions, collect_images_in_dir, evaluate_images, mean_score, read_image_list,
    write_scores_csv,
};
use vertebrae_counter::image_utils::color::BoxColor;
use vertebrae_counter::image_utils::image_io::{decode_selected_image, write_rgba8};
use vertebrae_counter::image_utils::overlay::render_annotations;
use vertebrae_counter::logging::init_logger;

#[derive(Parser, Debug)]
#[command(
    name = "vertebrae-counter",
    version,
    about = "Count vertebrae on an X-ray by overlaying boxes from a detection service"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send an image to the detection service and draw the returned boxes.
    Detect(DetectArgs),
    /// Score predicted YOLO labels against ground-truth labels.
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Image to submit.
    #[arg(long)]
    image: PathBuf,
    /// Detection endpoint URL (overrides the config file).
    #[arg(long)]
    endpoint: Option<String>,
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Request timeout in seconds (overrides the config file).
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Box color: #rrggbb, #rrggbbaa, rgb(), rgba() or a palette name.
    #[arg(long)]
    color: Option<BoxColor>,
    /// Keep the detections but draw none of them.
    #[arg(long, default_value_t = false)]
    hide_boxes: bool,
    /// Where to write the annotated image.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the boxes as JSON instead of just the count.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// File containing one image path per line.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,
    /// Evaluate every image under this directory instead of a list file.
    #[arg(long, conflicts_with = "input")]
    image_dir: Option<PathBuf>,
    /// Ground-truth label directory, relative to each image.
    #[arg(short = 'g', long, default_value = "../labels")]
    gt_path: PathBuf,
    /// Predicted label directory, relative to each image.
    #[arg(short = 'p', long, default_value = "../predictions")]
    pred_path: PathBuf,
    /// CSV of per-image scores.
    #[arg(short = 'o', long, default_value = "./mean_average_precision.csv")]
    output: PathBuf,
    /// Write a ground truth vs prediction overlay per image into this directory.
    #[arg(long)]
    overlay_dir: Option<PathBuf>,
    #[arg(long, default_value = "#ff0000")]
    gt_color: BoxColor,
    #[arg(long, default_value = "#00ff00")]
    pred_color: BoxColor,
}

#[derive(Serialize)]
struct DetectReport<'a> {
    image: String,
    count: usize,
    boxes_visible: bool,
    boxes: &'a [RenderBox],
}

fn run_detect(args: DetectArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint_url = endpoint;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.request_timeout_secs = timeout_secs;
    }
    config.validate()?;
    let client = HttpDetectionClient::new(&config.endpoint_url, config.request_timeout())?;
    let mut view = AnnotationView::new(client, config.box_style());

    view.select_image(Some(&args.image))?;
    info!("Counting vertebrae via {}...", view.endpoint().endpoint_url());
    view.submit_for_detection();
    if let Some(message) = view.state().last_error() {
        return Err(AppError::DetectionFailed(message.to_string()));
    }
    view.toggle_display(!args.hide_boxes);
    if let Some(color) = args.color {
        view.pick_color(color);
    }

    let state = view.state();
    if let (Some(output), Some(selected)) = (&args.output, state.image()) {
        let annotated = render_annotations(decode_selected_image(selected)?, state);
        write_rgba8(&annotated, output)?;
        info!("wrote {}", output.display());
    }
    if args.json {
        let report = DetectReport {
            image: args.image.display().to_string(),
            count: state.box_count(),
            boxes_visible: state.boxes_visible(),
            boxes: state.all_boxes(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Vertebrae count: {}", state.box_count());
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let images = match (&args.input, &args.image_dir) {
        (Some(list), _) => read_image_list(list)?,
        (None, Some(dir)) => collect_images_in_dir(dir)?,
        (None, None) => return Err(AppError::NoImagesGiven),
    };
    let options = EvaluationOptions {
        ground_truth_dir: args.gt_path,
        prediction_dir: args.pred_path,
        overlay_dir: args.overlay_dir,
        ground_truth_color: args.gt_color,
        prediction_color: args.pred_color,
        ..EvaluationOptions::default()
    };
    let scores = evaluate_images(&images, &options)?;
    write_scores_csv(&scores, &args.output)?;
    info!("wrote {}", args.output.display());
    match mean_score(&scores) {
        Some(mean) => println!("Mean score over {} images: {mean:.4}", scores.len()),
        None => println!("No images evaluated"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let result = match cli.command {
        Command::Detect(args) => run_detect(args),
        Command::Evaluate(args) => run_evaluate(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
