use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use bayes::classifier::Classifier;
use bayes::training_model::{TrainingModel, DEFAULT_SMOOTHING};
use dataloaders::mnist;

fn main() {
    let config = Config::new(env::args()).unwrap_or_else(|err| {
        eprintln!("Problem parsing arguments: {}", err);
        process::exit(1);
    });

    if let Err(e) = run(config) {
        eprintln!("Application error: {}", e);

        process::exit(1);
    }
}

pub fn run(config: Config) -> Result<(), Box<dyn Error>> {
    println!("Naive Bayes - MNIST");
    println!("Data folder: {}", config.folder.display());
    println!("Shade threshold: {}", config.threshold);
    println!("Smoothing: {}", config.smoothing);

    println!("\n-----------------\nTraining\n-----------------");
    let now = Instant::now();
    let (images, labels) = mnist::load_mnist(&config.folder, "train", config.threshold)?;
    println!("Training data has {} images", labels.len());
    println!(
        "Parsing the training dataset took: {} milliseconds",
        now.elapsed().as_millis()
    );

    let now = Instant::now();
    let mut model = TrainingModel::with_smoothing(config.smoothing);
    model.set_images(images)?;
    model.set_labels(labels)?;
    model.train()?;
    println!("Training took: {} milliseconds", now.elapsed().as_millis());

    println!("\n-----------------\nTesting\n-----------------");
    let now = Instant::now();
    let (test_images, test_labels) = mnist::load_mnist(&config.folder, "t10k", config.threshold)?;
    println!("Testing data has {} images", test_labels.len());
    println!(
        "Parsing the test dataset took: {} milliseconds",
        now.elapsed().as_millis()
    );

    let now = Instant::now();
    let mut classifier = Classifier::with_model(model);
    classifier.set_expected_labels(test_labels)?;
    let accuracy = classifier.accuracy(&test_images)?;
    println!("Testing took: {} milliseconds", now.elapsed().as_millis());

    println!("Accuracy: {}", accuracy);

    Ok(())
}

pub struct Config {
    pub folder: PathBuf,
    pub threshold: u8,
    pub smoothing: f64,
}

impl Config {
    pub fn new(mut args: env::Args) -> Result<Config, &'static str> {
        args.next();

        let folder = match args.next() {
            Some(arg) => PathBuf::from(arg),
            None => return Err("Didn't get a data folder"),
        };

        let threshold = match args.next() {
            Some(arg) => arg
                .parse::<u8>()
                .map_err(|_| "Shade threshold expects an u8, couldn't convert the input")?,
            None => mnist::DEFAULT_SHADE_THRESHOLD,
        };

        let smoothing = match args.next() {
            Some(arg) => arg
                .parse::<f64>()
                .map_err(|_| "Smoothing expects a number, couldn't convert the input")?,
            None => DEFAULT_SMOOTHING,
        };

        Ok(Config {
            folder,
            threshold,
            smoothing,
        })
    }
}
