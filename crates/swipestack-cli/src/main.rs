use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use tracing::{error, info};

use swipestack_core::app::{SessionBuilder, SwipeSession};
use swipestack_core::config::Config;
use swipestack_core::domain::{
    Category, Item, MarketCard, MarketStatus, ProfileCard, Settlement, Stroke,
};
use swipestack_core::impls::{
    InMemoryKvStore, KvMarketCatalog, KvPredictionLedger, StaticItemSource, TracingNotifier,
};
use swipestack_core::ports::{ItemSource, SystemClock, UlidGenerator};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Deck {
    /// Prediction markets read from the key-value store
    Markets,
    /// Forecaster profiles from a fixed deck
    Profiles,
}

/// Replay swipe strokes against a demo card stack.
#[derive(Debug, Parser)]
#[command(name = "swipestack", version)]
struct Args {
    /// TOML config file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "markets")]
    deck: Deck,

    /// JSON array of strokes (`{"dx": 120, "dy": 0, "velocity_x": 0.05}`)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Overrides `session.user_id`
    #[arg(long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {e}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    config.init_logging();
    info!(deck = ?args.deck, "swipestack starting");

    if let Err(e) = run(args, config).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }

    info!("swipestack stopped");
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let strokes = match &args.script {
        Some(path) => load_script(path)?,
        None => demo_strokes(),
    };
    let user_id = args.user.unwrap_or_else(|| config.session.user_id.clone());

    let store = Arc::new(InMemoryKvStore::new());
    let ids = Arc::new(UlidGenerator::new(SystemClock));
    let ledger = Arc::new(KvPredictionLedger::new(
        store.clone(),
        ids.clone(),
        Arc::new(SystemClock),
        user_id.clone(),
    ));

    let source: Arc<dyn ItemSource> = match args.deck {
        Deck::Markets => {
            let catalog = KvMarketCatalog::new(store.clone(), ids);
            seed_markets(&catalog, &demo_markets()?).await?;
            Arc::new(catalog)
        }
        Deck::Profiles => Arc::new(StaticItemSource::new(demo_profiles())),
    };

    let mut session = open_session(&config, source, ledger.clone()).await?;

    replay(&mut session, &strokes).await;

    let summary = session.finish().await;
    println!("summary: {}", serde_json::to_string_pretty(&summary)?);

    let records = ledger.predictions_for(&user_id).await?;
    println!("predictions for {user_id}: {}", records.len());
    for record in &records {
        println!("  {}", serde_json::to_string(record)?);
    }
    Ok(())
}

async fn seed_markets(catalog: &KvMarketCatalog, items: &[Item]) -> swipestack_core::Result<()> {
    for item in items {
        catalog.put(item).await?;
    }
    Ok(())
}

async fn open_session(
    config: &Config,
    source: Arc<dyn ItemSource>,
    sink: Arc<KvPredictionLedger>,
) -> swipestack_core::Result<SwipeSession> {
    let session = SessionBuilder::from_config(config)
        .source(source)
        .sink(sink)
        .notifier(Arc::new(TracingNotifier))
        .build()
        .await?;
    Ok(session)
}

async fn replay(session: &mut SwipeSession, strokes: &[Stroke]) {
    for (played, stroke) in strokes.iter().enumerate() {
        let Some(title) = session.current().map(|i| i.title().to_string()) else {
            println!("no more cards; {} stroke(s) left unplayed", strokes.len() - played);
            break;
        };
        let report = session.play(stroke).await;
        println!("{title:?}: dx={} dy={} -> {:?}", stroke.dx, stroke.dy, report.release);
        for settlement in &report.settled {
            match settlement {
                Settlement::Committed { outcome } => println!(
                    "  committed {:?} prediction={:?} stake={}",
                    outcome.direction, outcome.derived_prediction, outcome.stake
                ),
                Settlement::SprungBack { .. } => println!("  sprung back"),
            }
        }
    }
}

fn load_script(path: &Path) -> anyhow::Result<Vec<Stroke>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing script {}", path.display()))
}

fn demo_strokes() -> Vec<Stroke> {
    vec![
        Stroke::new(120.0, 0.0).with_release_velocity(0.05, 0.0),
        Stroke::new(-30.0, 0.0).with_release_velocity(-0.05, 0.0),
        Stroke::new(10.0, 0.0).with_release_velocity(0.25, 0.0),
        Stroke::new(0.0, -180.0),
        Stroke::new(-140.0, 0.0),
    ]
}

fn date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    s.parse().with_context(|| format!("invalid date {s}"))
}

#[allow(clippy::too_many_arguments)]
fn market(
    id: &str,
    title: &str,
    description: &str,
    category: Category,
    end_date: &str,
    pool_tenths: i64,
    yes_odds: u8,
    created_by: &str,
    tags: &[&str],
) -> anyhow::Result<Item> {
    Ok(Item::market(
        id,
        MarketCard {
            title: title.into(),
            description: description.into(),
            category,
            end_date: date(end_date)?,
            total_pool: Decimal::new(pool_tenths, 1),
            yes_odds,
            no_odds: 100 - yes_odds,
            image_url: Some("/hero.png".into()),
            created_by: created_by.into(),
            status: MarketStatus::Active,
            outcome: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        },
    ))
}

fn demo_markets() -> anyhow::Result<Vec<Item>> {
    Ok(vec![
        market(
            "1",
            "Will ETH reach $4,000 by end of 2024?",
            "Ethereum has been showing strong momentum. Will it break the $4,000 barrier before 2025?",
            Category::Crypto,
            "2024-12-31T00:00:00Z",
            52,
            65,
            "cryptowhale.eth",
            &["ethereum", "price-prediction"],
        )?,
        market(
            "2",
            "Will Farcaster reach 1M daily active users?",
            "The decentralized social protocol is growing rapidly. Can it hit the 1M DAU milestone?",
            Category::Farcaster,
            "2024-06-30T00:00:00Z",
            28,
            42,
            "dan.eth",
            &["farcaster", "social", "growth"],
        )?,
        market(
            "3",
            "Will Base TVL exceed $10B in 2024?",
            "Base is gaining traction as an L2 solution. Will total value locked surpass $10 billion this year?",
            Category::Crypto,
            "2024-12-31T00:00:00Z",
            35,
            55,
            "basebuilder.eth",
            &["base", "tvl", "defi"],
        )?,
        market(
            "4",
            "Will Bitcoin reach new ATH in 2024?",
            "Bitcoin is approaching its previous all-time high. Will it break through and set a new record?",
            Category::Crypto,
            "2024-12-31T00:00:00Z",
            87,
            72,
            "bitcoinmaxi.eth",
            &["bitcoin", "ath", "price"],
        )?,
    ])
}

fn profile(
    id: &str,
    name: &str,
    age: u32,
    prediction: &str,
    confidence: u8,
    category: Category,
    bio: &str,
) -> Item {
    Item::profile(
        id,
        ProfileCard {
            name: name.into(),
            age,
            prediction: prediction.into(),
            confidence,
            category,
            photo: None,
            bio: bio.into(),
        },
    )
}

fn demo_profiles() -> Vec<Item> {
    vec![
        profile(
            "p1",
            "Alex Chen",
            28,
            "ETH will reach $4,000 by end of 2024",
            85,
            Category::Crypto,
            "Crypto analyst with 5+ years experience. Bullish on Ethereum's potential.",
        ),
        profile(
            "p2",
            "Sarah Kim",
            24,
            "Farcaster will hit 1M daily users",
            72,
            Category::Social,
            "Social media strategist. Believes in decentralized social platforms.",
        ),
        profile(
            "p3",
            "Marcus Johnson",
            32,
            "Base TVL will exceed $10B",
            68,
            Category::Defi,
            "DeFi researcher focused on Layer 2 solutions and scaling.",
        ),
        profile(
            "p4",
            "Emma Rodriguez",
            29,
            "Bitcoin will reach new ATH",
            91,
            Category::Crypto,
            "Bitcoin maximalist and technical analyst. Strong believer in digital gold.",
        ),
    ]
}
