use argh::FromArgs;
use std::path::PathBuf;
use std::sync::Arc;

use rasterfx::{
    imgproc::{CancelToken, ExecutionStrategy, FilterJob, Pipeline, Step},
    io::functional as F,
};

#[derive(FromArgs)]
/// Apply filters and morphological operations to an image on a background thread
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path to the output image, its extension picks the format
    #[argh(option, short = 'o')]
    output_path: PathBuf,

    /// filter or morphology name, repeat to chain (e.g. -f gaussian -f close)
    #[argh(option, short = 'f')]
    filter: Vec<Step>,

    /// path to a JSON pipeline file, used instead of --filter
    #[argh(option, short = 'p')]
    pipeline: Option<PathBuf>,

    /// number of worker threads, 0 for the global pool (default: 0)
    #[argh(option, default = "0")]
    threads: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let pipeline = match &args.pipeline {
        Some(path) => serde_json::from_str::<Pipeline>(&std::fs::read_to_string(path)?)?,
        None => Pipeline::new(args.filter),
    };
    if pipeline.steps.is_empty() {
        return Err("no steps given, use --filter or --pipeline".into());
    }
    // fail on bad parameters before decoding the image
    pipeline.validate()?;

    let names: Vec<_> = pipeline.steps.iter().map(Step::name).collect();
    log::info!("pipeline: {}", names.join(" -> "));

    // read the image
    let image = Arc::new(F::read_image_rgb8(&args.image_path)?);
    log::info!("read {} ({})", args.image_path.display(), image.size());

    let strategy = match args.threads {
        0 => ExecutionStrategy::ParallelElements,
        n => ExecutionStrategy::Fixed(n),
    };

    // create a cancel token to stop the job
    let cancel_token = CancelToken::new();

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            log::warn!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.cancel();
        }
    })?;

    let job = FilterJob::spawn_with_token(pipeline, image, strategy, cancel_token);

    let mut last_decile = 0;
    for progress in job.progress() {
        let decile = progress.percent() / 10;
        if decile > last_decile {
            log::info!("progress {}%", decile * 10);
            last_decile = decile;
        }
    }

    match job.join() {
        Ok(filtered) => {
            F::write_image_rgb8(&args.output_path, &filtered)?;
            log::info!("wrote {}", args.output_path.display());
        }
        Err(e) if e.is_cancelled() => {
            log::warn!("cancelled, {} was not written", args.output_path.display());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
