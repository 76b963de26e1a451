use std::process::ExitCode;

use checkercal::cli::Args;
use checkercal::opencv::{
    ChessboardDetector, CvCalibrator, CvCamera, CvUndistortion, HighGuiKeys, HighGuiWindow,
};
use checkercal::session::{quality_grade, Capabilities};
use checkercal::{JsonResultWriter, SampleStore, SessionController};
use clap::Parser;
use log::{error, info};

const WINDOW_TITLE: &str = "checkercal";

fn main() -> ExitCode {
    let args = Args::parse();
    checkercal::logging::init(args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.session_config()?;
    info!(
        "board {}x{} inner corners, spacing {}; output {}",
        config.board.cols,
        config.board.rows,
        config.board.spacing,
        config.output_path.display()
    );

    let mut camera = CvCamera::open(&config.capture)?;
    let mut window = HighGuiWindow::new(WINDOW_TITLE)?;
    let mut keys = HighGuiKeys;
    let detector = ChessboardDetector::default();
    let writer = JsonResultWriter::new(&config.output_path);
    let mut store = SampleStore::new(config.board);

    let caps = Capabilities {
        frames: &mut camera,
        keys: &mut keys,
        display: &mut window,
        detector: &detector,
        calibrator: &CvCalibrator,
        undistortion: &CvUndistortion,
        writer: &writer,
    };
    let outcome = SessionController::new(&config, caps, &mut store).run()?;

    match outcome.result {
        Some(result) => info!(
            "done: {} samples, RMS {:.4} ({}), written to {}",
            outcome.samples,
            result.rms,
            quality_grade(result.rms),
            writer.path().display()
        ),
        None => info!("done: {} samples, no calibration", outcome.samples),
    }
    Ok(())
}
