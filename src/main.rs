use clap::{Args, Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;

use product_recommender::{
    catalog, file_utils, train, vector_db::VectorDatabase, CatalogProvider, Command,
    EngineConfig, Error, JsonFileCatalog, Result, User, Worker, WorkerEvent,
};

#[derive(Parser)]
#[command(version, about = "Product feature vectors and recommendations")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Train and print the vector of every product
    Vectors(TrainArgs),
    /// Train through the worker and recommend products for one user
    Recommend {
        #[command(flatten)]
        train: TrainArgs,
        #[arg(long)]
        age: f32,
        /// Comma separated product names the user already bought
        #[arg(long, value_delimiter = ',')]
        purchased: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the products closest to a given product
    Similar {
        #[command(flatten)]
        train: TrainArgs,
        #[arg(long)]
        product: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// Catalog JSON, defaults to products.json in the data directory
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Users JSON
    #[arg(long)]
    users: PathBuf,
    /// Engine config JSON, defaults to config.json in the data directory if present
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    single_threaded: bool,
}

impl TrainArgs {
    fn catalog(&self) -> Result<JsonFileCatalog> {
        let path = match &self.catalog {
            Some(path) => path.clone(),
            None => file_utils::catalog_path()?,
        };
        Ok(JsonFileCatalog::new(path))
    }

    fn users(&self) -> Result<Vec<User>> {
        catalog::load_users(&self.users)
    }

    fn config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => {
                let default_path = file_utils::config_path()?;
                if default_path.exists() {
                    EngineConfig::from_file(&default_path)?
                } else {
                    EngineConfig::default()
                }
            }
        };
        if self.single_threaded {
            config.run_mode = product_recommender::RunMode::SingleThreaded;
        }
        Ok(config)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.mode {
        Mode::Vectors(args) => print_vectors(&args),
        Mode::Recommend {
            train,
            age,
            purchased,
            limit,
        } => {
            let names: Vec<&str> = purchased.iter().map(String::as_str).collect();
            recommend_for(&train, User::new(age, &names), limit)
        }
        Mode::Similar {
            train,
            product,
            limit,
        } => print_similar(&train, &product, limit),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

fn print_vectors(args: &TrainArgs) -> Result<()> {
    let catalog = args.catalog()?.fetch_catalog()?;
    let context = train(&catalog, &args.users()?, &args.config()?, |_| {})?;
    println!("dimensions: {}", context.dimensions());
    for product_vector in context.product_vectors() {
        let values: Vec<String> = product_vector
            .feature_vector()
            .iter()
            .map(|v| format!("{v:.3}"))
            .collect();
        println!("{}: [{}]", product_vector.name(), values.join(", "));
    }
    Ok(())
}

fn print_similar(args: &TrainArgs, product: &str, limit: usize) -> Result<()> {
    let catalog = args.catalog()?.fetch_catalog()?;
    let context = train(&catalog, &args.users()?, &args.config()?, |_| {})?;
    let db = VectorDatabase::from_features(context.product_vectors());
    let similar = db
        .find_similar(product, limit)
        .ok_or_else(|| Error::UnknownProduct(product.to_string()))?;
    for result in similar {
        println!("{}: {:.3}", result.name(), result.score);
    }
    Ok(())
}

fn recommend_for(args: &TrainArgs, user: User, limit: Option<usize>) -> Result<()> {
    let mut config = args.config()?;
    if let Some(limit) = limit {
        config.num_recommendations = limit;
    }
    let catalog = args.catalog()?;
    info!("Using catalog {}", catalog.path().display());

    let worker = Worker::spawn(catalog, config);
    worker.send(Command::TrainModel {
        users: args.users()?,
    })?;
    worker.send(Command::Recommend { user })?;

    let mut failure = None;
    for event in worker.events().iter() {
        match event {
            WorkerEvent::ProgressUpdate { progress } => info!("Training progress: {progress}%"),
            WorkerEvent::TrainingLog {
                epoch,
                loss,
                accuracy,
            } => info!("Epoch {epoch}: loss {loss}, accuracy {accuracy}"),
            WorkerEvent::TrainingComplete { version } => info!("Context v{version} ready"),
            WorkerEvent::Recommend {
                recommendations, ..
            } => {
                for (rank, r) in recommendations.iter().enumerate() {
                    println!(
                        "{}. {} ({}, {}, {:.2}): {:.3}",
                        rank + 1,
                        r.product.name,
                        r.product.category,
                        r.product.color,
                        r.product.price,
                        r.score
                    );
                }
                break;
            }
            WorkerEvent::Error { message } => {
                failure = Some(Error::Worker(message));
                break;
            }
        }
    }
    worker.shutdown()?;
    failure.map_or(Ok(()), Err)
}
