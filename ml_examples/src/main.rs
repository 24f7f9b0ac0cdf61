// ml_examples/src/main.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use loan_risk::{
    accuracy, confusion_matrix, feed_forward, generate_separable_data, load_encoded,
    print_model_summary, transform_json_to_csv, Dataset, Encoder, RiskConfig, RiskNetwork,
    TrainingConfig,
};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(about = "Encode the loan dataset and train the risk network")]
struct Cli {
    /// JSON config file; missing fields keep their defaults
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct TrainArgs {
    #[arg(short, long, value_name = "INT")]
    epochs: Option<usize>,
    #[arg(short, long, value_name = "FLOAT")]
    learning_rate: Option<f64>,
    /// Seed for weight initialization
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten the column-oriented JSON dataset into a CSV
    Transform {
        #[arg(
            long,
            value_name = "PATH",
            default_value = "loan_approval_dataset.json"
        )]
        input: PathBuf,
        #[arg(long, value_name = "PATH", default_value = "transformed_data.csv")]
        output: PathBuf,
    },
    /// Encode a raw CSV into normalized numeric features
    Encode {
        #[arg(long, value_name = "PATH", default_value = "transformed_data.csv")]
        input: PathBuf,
        #[arg(long, value_name = "PATH", default_value = "encoded_data.csv")]
        output: PathBuf,
    },
    /// Train on an encoded CSV and report accuracy with the trained weights
    Train {
        #[arg(short, long, value_name = "PATH", default_value = "encoded_data.csv")]
        data: PathBuf,
        #[command(flatten)]
        train: TrainArgs,
    },
    /// Predict with freshly initialized, untrained weights
    Baseline {
        #[arg(short, long, value_name = "PATH", default_value = "encoded_data.csv")]
        data: PathBuf,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Encode then train
    Run {
        #[arg(long, value_name = "PATH", default_value = "transformed_data.csv")]
        input: PathBuf,
        #[arg(long, value_name = "PATH", default_value = "encoded_data.csv")]
        encoded: PathBuf,
        #[command(flatten)]
        train: TrainArgs,
    },
    /// Train on generated, linearly separable data
    Demo {
        #[arg(long, default_value_t = 500)]
        samples: usize,
        #[arg(long, default_value_t = 6)]
        features: usize,
        #[command(flatten)]
        train: TrainArgs,
    },
}

fn load_config(path: Option<&Path>) -> Result<RiskConfig> {
    match path {
        Some(p) => {
            let config = RiskConfig::from_json_file(p)
                .with_context(|| format!("loading config {}", p.display()))?;
            info!("loaded config from {}", p.display());
            Ok(config)
        }
        None => Ok(RiskConfig::default()),
    }
}

fn training_config(base: TrainingConfig, args: &TrainArgs) -> Result<TrainingConfig> {
    let config = base.merge(args.epochs, args.learning_rate, args.seed);
    config.validate()?;
    info!(
        "training for {} epochs at learning rate {}",
        config.epochs, config.learning_rate
    );
    Ok(config)
}

fn train_and_report(data: &Dataset, config: &TrainingConfig) -> Result<()> {
    let mut rng = config.rng();
    let mut network = RiskNetwork::new(data.input_size(), &mut rng)?;
    print_model_summary(&network);
    let report = network.train(data, config)?;
    if let Some(loss) = report.final_loss() {
        info!("final average loss {loss}");
    }
    let acc = accuracy(data, &network)?;
    let cm = confusion_matrix(data, &network)?;
    println!("Training Accuracy: {:.2}%", acc * 100.0);
    println!("Confusion matrix [true][pred]: {:?}", cm);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Transform { input, output } => {
            transform_json_to_csv(&input, &output)
                .with_context(|| format!("transforming {}", input.display()))?;
        }
        Command::Encode { input, output } => {
            Encoder::new(config.schema)
                .encode_file(&input, &output)
                .with_context(|| format!("encoding {}", input.display()))?;
        }
        Command::Train { data, train } => {
            let training = training_config(config.training, &train)?;
            let dataset = load_encoded(&data)?;
            train_and_report(&dataset, &training)?;
        }
        Command::Baseline { data, seed } => {
            let training = config.training.merge(None, None, seed);
            let dataset = load_encoded(&data)?;
            let predictions = feed_forward(&dataset, &mut training.rng())?;
            info!("{} predictions from untrained weights", predictions.len());
        }
        Command::Run {
            input,
            encoded,
            train,
        } => {
            let training = training_config(config.training, &train)?;
            Encoder::new(config.schema)
                .encode_file(&input, &encoded)
                .with_context(|| format!("encoding {}", input.display()))?;
            let dataset = load_encoded(&encoded)?;
            train_and_report(&dataset, &training)?;
        }
        Command::Demo {
            samples,
            features,
            train,
        } => {
            let training = training_config(config.training, &train)?;
            let dataset = generate_separable_data(samples, features, &mut training.rng());
            train_and_report(&dataset, &training)?;
        }
    }

    Ok(())
}
