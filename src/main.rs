use anyhow::Context;
use clap::{Parser, Subcommand};
use classifier::{Classifier, LexiconSet};
use post_sources::{
    fetch_all, DumpFormat, JsonDumpSource, PostSource, RetryConfig, SearchQuery, TimeFilter,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trendsift_core::{
    parse_post_batch, AppConfig, Category, ClassifiedPosts, CoreError, ErrorReporter, Post,
};

#[derive(Parser)]
#[command(name = "trendsift")]
#[command(about = "Sort social posts into pain points, trending ideas and content ideas", long_about = None)]
struct Cli {
    /// Config file (falls back to $TRENDSIFT_CONFIG, then built-in defaults)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify posts from saved dumps (or a post array on stdin)
    Classify {
        /// Posts per category, overrides the config
        #[arg(short = 'n', long)]
        cap: Option<usize>,

        /// JSON array of normalized post records
        #[arg(long = "posts", value_name = "FILE")]
        posts: Vec<PathBuf>,

        /// Saved Reddit search listing
        #[arg(long = "reddit", value_name = "FILE")]
        reddit: Vec<PathBuf>,

        /// Saved X recent-search response
        #[arg(long = "x", value_name = "FILE")]
        x: Vec<PathBuf>,

        /// Saved YouTube Data API list response
        #[arg(long = "youtube", value_name = "FILE")]
        youtube: Vec<PathBuf>,

        /// The search query the posts were gathered for
        #[arg(short, long, default_value = "")]
        query: String,

        #[arg(short = 't', long, default_value = "week")]
        time_filter: TimeFilter,

        /// Maximum posts taken from each input
        #[arg(short, long)]
        limit: Option<usize>,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the effective keyword lexicons
    Lexicon,
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    query: &'a str,
    #[serde(flatten)]
    result: ClassifiedPosts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("trendsift=info,classifier=info,post_sources=info")
        }))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let error = CoreError::from(e);
            ErrorReporter::new().report_error(&error);
            return Err(error).context("failed to load configuration");
        }
    };

    match cli.command {
        Commands::Classify {
            cap,
            posts,
            reddit,
            x,
            youtube,
            query,
            time_filter,
            limit,
            pretty,
        } => {
            let mut search = SearchQuery::new(query).with_time_filter(time_filter);
            if let Some(limit) = limit {
                search = search.with_limit(limit);
            }

            let inputs = [
                (DumpFormat::Posts, posts),
                (DumpFormat::Reddit, reddit),
                (DumpFormat::X, x),
                (DumpFormat::YouTube, youtube),
            ];
            let sources: Vec<Box<dyn PostSource>> = inputs
                .into_iter()
                .flat_map(|(format, paths)| {
                    paths.into_iter().map(move |path| {
                        Box::new(JsonDumpSource::new(path, format)) as Box<dyn PostSource>
                    })
                })
                .collect();

            let collected = if sources.is_empty() {
                read_stdin_posts(search.limit)?
            } else {
                let retry = RetryConfig::from(&config.sources);
                let outcome = fetch_all(&sources, &search, &retry).await;
                if outcome.all_failed() {
                    tracing::warn!("Every input failed; classifying an empty batch");
                }
                outcome.posts
            };

            let mut classifier = Classifier::from_config(&config);
            if let Some(cap) = cap {
                classifier = classifier.with_cap(cap);
            }

            let output = ClassifyOutput {
                query: &search.query,
                result: classifier.classify(&collected, &search.query),
            };
            print_json(&output, pretty)?;
        }
        Commands::Lexicon => {
            let lexicons = LexiconSet::with_overrides(&config.lexicons);
            let table: BTreeMap<&str, BTreeMap<&str, u32>> = Category::ALL
                .iter()
                .map(|&category| (category.key(), lexicons.get(category).iter().collect()))
                .collect();
            print_json(&table, true)?;
        }
    }

    Ok(())
}

fn read_stdin_posts(limit: Option<usize>) -> anyhow::Result<Vec<Post>> {
    tracing::info!("No input files given, reading a post array from stdin");
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;

    let payload: serde_json::Value =
        serde_json::from_str(&buffer).context("stdin is not valid JSON")?;
    let mut posts = parse_post_batch(payload)?;
    if let Some(limit) = limit {
        posts.truncate(limit);
    }
    Ok(posts)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
