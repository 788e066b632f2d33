mod config;
mod demo;
mod driver;

use clap::{Parser, Subcommand};
use radar_core::CompanyDatabase;
use radar_dom::{Document, History, NodeSnapshot};
use radar_engine::{Engine, EngineConfig};
use radar_store::{MemoryStore, SettingsStore, SqliteStore};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "radar")]
#[command(about = "Detect company mentions in page snapshots and inject referral badges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan pass over a page snapshot and report injected badges
    Scan {
        #[arg(help = "Path to a JSON page snapshot")]
        page: String,
        #[arg(short, long, help = "Path to a referral database JSON file")]
        data: String,
    },
    /// Load a referral database file into the settings store
    Import {
        #[arg(help = "Path to a referral database JSON file")]
        data: String,
        #[arg(long, default_value = "./radar-data/radar.db")]
        db: String,
    },
    /// List the known companies in a database file or settings store
    Companies {
        #[arg(short, long)]
        data: Option<String>,
        #[arg(long)]
        db: Option<String>,
    },
    /// Drive the engine against a scripted demo page
    Simulate {
        #[arg(short, long, help = "Referral database JSON file used to seed the store")]
        data: Option<String>,
        #[arg(long, help = "SQLite settings store path (volatile store if omitted)")]
        db: Option<String>,
        #[arg(short = 'f', long, help = "Path to config file")]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radar=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan { page, data } => run_scan(page, data),
        Commands::Import { data, db } => run_import(data, db),
        Commands::Companies { data, db } => run_companies(data, db),
        Commands::Simulate { data, db, config } => run_simulate(data, db, config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn load_database(path: &str) -> Result<CompanyDatabase, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    Ok(CompanyDatabase::from_value(value)?)
}

fn run_scan(page: String, data: String) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&page)?;
    let snapshot: NodeSnapshot = serde_json::from_str(&content)?;
    let mut doc = Document::from_snapshot(&snapshot);

    let db = load_database(&data)?;
    let mut engine = Engine::new(EngineConfig::default())?;
    engine.update_database(&mut doc, db);

    let history = History::new("file://snapshot");
    engine.start(&mut doc, &history, Instant::now());

    let mut rows: Vec<(String, String)> = engine
        .tracker()
        .entries()
        .into_iter()
        .map(|(target, entry)| (entry.company, doc.tag(target).to_string()))
        .collect();
    rows.sort();

    for (company, tag) in &rows {
        let count = engine.database().referrers(company).len();
        println!("{}  <{}>  {} referrer(s)", company, tag, count);
    }
    println!("{} badge(s) injected", rows.len());
    Ok(())
}

fn run_import(data: String, db: String) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = std::path::Path::new(&db).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let database = load_database(&data)?;
    let mut store = SqliteStore::open(&db)?;
    store.save_database(&database)?;
    println!("imported {} companies into {}", database.len(), db);
    Ok(())
}

fn run_companies(
    data: Option<String>,
    db: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let database = match (&data, &db) {
        (Some(path), _) => load_database(path)?,
        (None, Some(path)) => SqliteStore::open(path)?.load_database()?,
        (None, None) => return Err("pass --data or --db".into()),
    };
    for company in database.keys() {
        println!("{}  {} referrer(s)", company, database.referrers(company).len());
    }
    println!("{} companies", database.len());
    Ok(())
}

async fn run_simulate(
    data: Option<String>,
    db: Option<String>,
    config_path: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => config::RadarConfig::from_file(&path)?,
        None => config::RadarConfig::default(),
    };
    let db_path = db.or_else(|| config.db.as_ref().map(|d| d.path.clone()));
    let data_path = data.or_else(|| config.data.as_ref().map(|d| d.path.clone()));

    let mut store: Box<dyn SettingsStore> = match db_path {
        Some(path) => {
            if let Some(parent) = std::path::Path::new(&path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(SqliteStore::open(&path)?)
        }
        None => Box::new(MemoryStore::new()),
    };

    if store.load_database()?.is_empty() {
        let seed = match &data_path {
            Some(path) => load_database(path)?,
            None => demo::sample_database(),
        };
        store.save_database(&seed)?;
    }

    let engine = Engine::new(config.engine_config())?;
    driver::run_simulation(engine, store).await
}
