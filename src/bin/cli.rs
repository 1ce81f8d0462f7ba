//! talon CLI
//!
//! Collects timeline posts through a headless browser and reports over
//! the resulting JSON-lines archives.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use talon::{
    error::{AppError, Result},
    models::{Config, Post},
    services::{stats::hashtag_frequencies, LanguageFilter, TimelineStats},
};

/// talon - Twitter timeline scraper
#[derive(Parser, Debug)]
#[command(name = "talon", version, about = "Twitter timeline scraper")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect posts from live timelines
    #[cfg(feature = "browser")]
    Scrape {
        #[command(subcommand)]
        command: ScrapeCommand,
    },

    /// Aggregate statistics over a JSON-lines archive
    Stats {
        /// Archive file, one post per line
        input: PathBuf,

        /// Keep only entries in this language
        #[arg(short, long)]
        language: Option<String>,

        /// Wordlist file backing the language filter, one word per line
        #[arg(long)]
        wordlist: Option<PathBuf>,

        /// Fraction of recognized words required to keep an entry
        #[arg(short, long, default_value_t = 0.5)]
        percentage: f64,
    },

    /// Hashtag frequencies over a JSON-lines archive
    Hashtags {
        /// Archive file, one post per line
        input: PathBuf,
    },
}

#[cfg(feature = "browser")]
#[derive(Subcommand, Debug)]
enum ScrapeCommand {
    /// Scrape a hashtag timeline, emitting "id, username" lines
    Ids {
        /// Hashtag to search for (leading '#' optional)
        hashtag: String,

        /// How many times to scroll per cycle
        #[arg(short, long, default_value_t = 10)]
        per_driver: usize,

        /// How many pagination cycles to run
        #[arg(short, long, default_value_t = 1)]
        times: usize,

        /// Resume below this post id
        #[arg(short, long)]
        from_id: Option<String>,

        /// Filter results by language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Re-fetch full posts from "id, username" lines, emitting JSON lines
    Hydrate {
        /// Checkpoint file produced by `scrape ids`
        input: PathBuf,

        /// Replace the browser session every N page loads
        #[arg(short, long, default_value_t = 1000)]
        reload_every: usize,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;
    let config = Arc::new(config);

    match cli.command {
        #[cfg(feature = "browser")]
        Command::Scrape { command } => run_scrape(command, config).await?,

        Command::Stats {
            input,
            language,
            wordlist,
            percentage,
        } => {
            let filter = match (language, wordlist) {
                (Some(language), Some(path)) => {
                    Some(LanguageFilter::from_wordlist(language, &path, percentage)?)
                }
                (Some(_), None) => {
                    return Err(AppError::config(
                        "--language requires --wordlist to recognize words",
                    ));
                }
                _ => None,
            };

            let mut stats = TimelineStats::new(filter);
            for post in read_archive(&input)? {
                stats.record(&post);
            }
            print!("{}", stats.report());
        }

        Command::Hashtags { input } => {
            let posts = read_archive(&input)?;
            for (hashtag, count) in hashtag_frequencies(posts.iter()) {
                println!("{hashtag} = {count}");
            }
        }
    }

    Ok(())
}

/// Load every post from a JSON-lines archive, skipping unreadable lines.
fn read_archive(path: &PathBuf) -> Result<Vec<Post>> {
    let reader = BufReader::new(File::open(path)?);
    let mut posts = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Post>(&line) {
            Ok(post) => posts.push(post),
            Err(e) => log::warn!("Skipping line {}: {}", number + 1, e),
        }
    }
    Ok(posts)
}

#[cfg(feature = "browser")]
async fn run_scrape(command: ScrapeCommand, config: Arc<Config>) -> Result<()> {
    use talon::models::SearchQuery;
    use talon::pipeline::{hydrate::parse_checkpoint_line, Hydrator, TimelineScraper};
    use talon::session::ChromeSessionFactory;

    match command {
        ScrapeCommand::Ids {
            hashtag,
            per_driver,
            times,
            from_id,
            language,
        } => {
            let mut config = (*config).clone();
            config.scraper.per_driver = per_driver;
            config.scraper.times = times;
            let config = Arc::new(config);

            let mut query = SearchQuery::new(normalize_hashtag(&hashtag));
            if let Some(language) = language {
                query = query.language(language);
            }

            let factory = Box::new(ChromeSessionFactory::new(config.session.clone()));
            let scraper = TimelineScraper::new(factory, Arc::clone(&config))?;
            let mut stream = scraper.scrape_many(query, times, from_id);

            while let Some(item) = stream.next().await {
                let post = item?;
                println!("{}, {}", post.entry.id, post.entry.username);
            }
        }

        ScrapeCommand::Hydrate {
            input,
            reload_every,
        } => {
            let mut config = (*config).clone();
            config.scraper.reload_every = reload_every;
            let config = Arc::new(config);

            let factory = Box::new(ChromeSessionFactory::new(config.session.clone()));
            let mut hydrator = Hydrator::new(factory, Arc::clone(&config))?;

            let reader = BufReader::new(File::open(&input)?);
            for line in reader.lines() {
                let line = line?;
                let Some((id, username)) = parse_checkpoint_line(&line) else {
                    log::warn!("Skipping malformed checkpoint line: {:?}", line);
                    continue;
                };
                match hydrator.hydrate(id, username).await {
                    Ok(post) => println!("{}", serde_json::to_string(&post)?),
                    Err(AppError::SessionUnavailable(record)) => {
                        // record no longer resolves; move on
                        log::debug!("Skipping unavailable record {}", record);
                    }
                    Err(e) => {
                        hydrator.close().await?;
                        return Err(e);
                    }
                }
            }
            hydrator.close().await?;
        }
    }

    Ok(())
}

/// Accept hashtags with or without the leading '#'.
#[cfg(feature = "browser")]
fn normalize_hashtag(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{trimmed}")
    }
}
