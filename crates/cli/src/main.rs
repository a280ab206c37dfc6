mod llm;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_license::{Availability, LicenseProfile, LicenseQueryClassifier, Tier, TierInferencer};
use deck_query_cache::{JsonFileStore, QueryCache};
use deck_search::{HybridRetriever, RetrieverConfig, SemanticScorer};
use deck_slide_store::{EmbeddingSet, OpenAiEmbedder, ScoredSlide, SlideStore};
use llm::ChatClient;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "deck", version, about = "Answer questions against a slide deck corpus")]
struct Cli {
    /// Extractor output: JSON object mapping slide_id -> text
    #[arg(long, global = true, default_value = "slides.json")]
    slides: PathBuf,

    /// Precomputed slide embeddings (optional; absence disables semantic search)
    #[arg(long, global = true, default_value = "embeddings.json")]
    embeddings: PathBuf,

    /// Query result cache file
    #[arg(long, global = true, default_value = "query_cache.json")]
    cache_file: PathBuf,

    /// Cache TTL in hours
    #[arg(long, global = true, default_value_t = 24.0)]
    ttl_hours: f64,

    /// License profile overriding the built-in one
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve relevant slides for a question, optionally with an LLM answer
    Query {
        text: String,

        /// Maximum number of slides to return
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Force keyword scoring even when embeddings exist
        #[arg(long)]
        keyword: bool,

        /// Skip the cache for this request (no read, no write)
        #[arg(long)]
        no_cache: bool,

        /// Recompute and overwrite any cached result
        #[arg(long)]
        refresh: bool,

        /// Summarize the retrieved slides with the LLM provider
        #[arg(long)]
        answer: bool,
    },

    /// Classify a license question and print the inferred tier report
    License {
        text: String,

        /// Slides consulted for evidence
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Cache administration
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Corpus statistics
    Stats,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Number of live entries
    Stats,
    /// Remove all expired entries
    Cleanup,
    /// Drop every entry
    Clear,
    /// Drop the entry for one query
    Delete { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Query {
            text,
            limit,
            keyword,
            no_cache,
            refresh,
            answer,
        } => {
            run_query(&cli, text, *limit, *keyword, *no_cache, *refresh, *answer).await
        }
        Command::License { text, limit } => run_license(&cli, text, *limit).await,
        Command::Cache { action } => run_cache(&cli, action).await,
        Command::Stats => run_stats(&cli).await,
    }
}

async fn run_query(
    cli: &Cli,
    text: &str,
    limit: usize,
    keyword: bool,
    no_cache: bool,
    refresh: bool,
    answer: bool,
) -> Result<()> {
    let cache = open_cache(cli).await;

    if !no_cache && !refresh {
        if let Some(cached) = cache.get(text).await {
            println!("{}", serde_json::to_string_pretty(&cached)?);
            return Ok(());
        }
    }

    let retriever = build_retriever(cli).await?;
    let use_semantic = keyword.then_some(false);
    let results = retriever
        .retrieve(text, limit, use_semantic)
        .await
        .context("retrieval failed")?;

    let summary = if answer && !results.is_empty() {
        match ChatClient::from_env() {
            Some(client) => match client.summarize(text, &results).await {
                Ok(summary) => Some(summary),
                Err(err) => {
                    log::warn!("Answer generation failed, returning sources only: {err}");
                    None
                }
            },
            None => {
                log::warn!("OPENAI_API_KEY not set, returning sources only");
                None
            }
        }
    } else {
        None
    };

    let result = json!({
        "summary": summary,
        "sources": sources_json(&results),
    });

    if !no_cache {
        cache.set(text, result.clone()).await;
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_license(cli: &Cli, text: &str, limit: usize) -> Result<()> {
    let profile = load_profile(cli)?;
    let retriever = build_retriever(cli).await?;
    let results = retriever
        .retrieve(text, limit, Some(false))
        .await
        .context("retrieval failed")?;

    let classifier = LicenseQueryClassifier::new(Arc::clone(&profile));
    let classification = classifier.classify(text);
    if !classification.is_license_query {
        println!("Not a license-comparison question; analyzing anyway.");
    }

    let inferencer = TierInferencer::new(profile);
    let texts: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
    let report = inferencer.infer_tiers(&classification.feature, texts);

    println!("Feature: {}", report.feature);
    if report.used_defaults {
        println!("(no slide evidence found; using typical licensing defaults)");
    }
    for tier in Tier::ORDER {
        let verdict = match report.tiers[&tier] {
            Availability::Included => "included",
            Availability::NotIncluded => "not included",
            Availability::Unknown => "no information",
        };
        println!("  {tier:<12} {verdict}");
    }
    Ok(())
}

async fn run_cache(cli: &Cli, action: &CacheAction) -> Result<()> {
    let cache = open_cache(cli).await;
    match action {
        CacheAction::Stats => println!("{} live entries", cache.len().await),
        CacheAction::Cleanup => println!("removed {} expired entries", cache.cleanup().await),
        CacheAction::Clear => {
            cache.clear().await;
            println!("cache cleared");
        }
        CacheAction::Delete { text } => {
            if cache.delete(text).await {
                println!("entry deleted");
            } else {
                println!("no entry for that query");
            }
        }
    }
    Ok(())
}

async fn run_stats(cli: &Cli) -> Result<()> {
    let store = SlideStore::load(&cli.slides)
        .await
        .context("loading slide corpus")?;
    println!("slides: {}", store.len());

    match EmbeddingSet::load(&cli.embeddings).await? {
        Some(set) => println!("embeddings: {} (dimension {})", set.len(), set.dimension()),
        None => println!("embeddings: none (semantic search disabled)"),
    }
    Ok(())
}

async fn build_retriever(cli: &Cli) -> Result<HybridRetriever> {
    let store = Arc::new(
        SlideStore::load(&cli.slides)
            .await
            .context("loading slide corpus")?,
    );

    let semantic = match EmbeddingSet::load(&cli.embeddings).await? {
        Some(set) => match OpenAiEmbedder::from_env() {
            Ok(embedder) => Some(SemanticScorer::new(Arc::new(set), Arc::new(embedder))),
            Err(err) => {
                log::warn!("Embedding provider unavailable ({err}); keyword search only");
                None
            }
        },
        None => None,
    };

    let profile = load_profile(cli)?;
    Ok(HybridRetriever::new(
        store,
        semantic,
        LicenseQueryClassifier::new(profile),
        RetrieverConfig::default(),
    ))
}

fn load_profile(cli: &Cli) -> Result<Arc<LicenseProfile>> {
    let profile = match &cli.profile {
        Some(path) => LicenseProfile::from_file(path)?,
        None => LicenseProfile::builtin()?,
    };
    Ok(Arc::new(profile))
}

async fn open_cache(cli: &Cli) -> QueryCache {
    let ttl = Duration::from_secs_f64(cli.ttl_hours.max(0.0) * 3600.0);
    QueryCache::open(JsonFileStore::new(&cli.cache_file), ttl).await
}

fn sources_json(results: &[ScoredSlide]) -> serde_json::Value {
    json!(results
        .iter()
        .map(|r| {
            json!({
                "slide_id": r.slide_id,
                "content_preview": r.content_preview,
                "relevance_score": r.score,
            })
        })
        .collect::<Vec<_>>())
}
