use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use bayes::classifier::Classifier;
use bayes::training_model::{TrainingModel, DEFAULT_SMOOTHING};
use dataloaders::ascii;

/// Trains, saves, loads, and evaluates a naive bayes model over ascii
/// raster images.
#[derive(Parser)]
#[command(name = "train_model")]
struct Args {
    /// File path for the training images
    #[arg(long, value_name = "FILE")]
    read_images: Option<PathBuf>,

    /// File path for the training labels
    #[arg(long, value_name = "FILE")]
    read_labels: Option<PathBuf>,

    /// File path to save probability data to
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// File path to load probability data from
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// File path for the testing images
    #[arg(long, value_name = "FILE")]
    read_test_images: Option<PathBuf>,

    /// File path for the testing labels
    #[arg(long, value_name = "FILE")]
    read_test_labels: Option<PathBuf>,

    /// Laplace smoothing constant
    #[arg(long, default_value_t = DEFAULT_SMOOTHING)]
    smoothing: f64,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.read_images.is_none()
        && args.read_labels.is_none()
        && args.save.is_none()
        && args.load.is_none()
        && args.read_test_images.is_none()
        && args.read_test_labels.is_none()
    {
        info!("no arguments were provided; pass --help for the available flags");
        return Ok(());
    }

    let trained = match (&args.read_images, &args.read_labels) {
        (Some(images_path), Some(labels_path)) => {
            let mut model = TrainingModel::with_smoothing(args.smoothing);
            model.set_images(ascii::load_images(images_path)?)?;
            info!("images successfully read");
            model.read_labels(labels_path)?;
            info!("labels successfully read");
            model.train()?;
            info!("model trained on {} images", model.labels().len());
            Some(model)
        }
        (None, None) => None,
        _ => return Err("training requires both --read-images and --read-labels".into()),
    };

    let loaded = match &args.load {
        Some(load_path) => {
            let model = TrainingModel::load_from_file(load_path)?;
            info!("probability data loaded from {}", load_path.display());
            Some(model)
        }
        None => None,
    };

    if let Some(save_path) = &args.save {
        match trained.as_ref().or_else(|| loaded.as_ref()) {
            Some(model) => {
                model.save_to_file(save_path)?;
                info!("probability data saved to {}", save_path.display());
            }
            None => {
                return Err("the model could not be saved because it was not trained".into());
            }
        }
    }

    match (&args.read_test_images, &args.read_test_labels) {
        (Some(test_images_path), Some(test_labels_path)) => {
            let model = loaded
                .or(trained)
                .ok_or("testing requires --load or a freshly trained model")?;
            let mut classifier = Classifier::with_model(model);
            classifier.read_expected(test_labels_path)?;
            let test_images = ascii::load_images(test_images_path)?;
            println!("Accuracy: {}", classifier.accuracy(&test_images)?);
        }
        (None, None) => {}
        _ => return Err("a test file was missing".into()),
    }

    Ok(())
}
