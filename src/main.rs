//! Delete the private messages between two users from the message index
//! and drop the stale cached conversation history.
//!
//! The messaging platform offers no bulk deletion of private chats, so
//! this tool works directly against the storage tier: a scrolled search
//! collects every message exchanged between the two users, the operator
//! reviews and confirms, a bulk request deletes the documents, and the
//! affected history cache entries are removed.
//!
//! Direct backend access bypasses the platform's own API. Use at your own
//! risk, and make absolutely sure the user ids are correct.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use clap::Parser;

mod cache;
mod config;
mod fetch;
mod observability;
mod purge;
mod report;
mod search;

#[cfg(test)]
mod tests;

use cache::{HistoryCache, RedisCache};
use config::PurgeConfig;
use fetch::FetchOutcome;
use purge::{Outcome, PurgeError};
use search::{ConversationFilter, SearchClient};

/// The exact token the operator must type to confirm deletion.
const CONFIRMATION_TOKEN: &str = "YES";

#[derive(Parser, Debug)]
#[command(version, about = "Delete the private messages between two users", long_about = None)]
struct Args {
    /// User ID of user A.
    #[arg(short = 'a', long)]
    user_a: String,

    /// User ID of user B.
    #[arg(short = 'b', long)]
    user_b: String,

    /// Show private messages truncated to 50 characters.
    /// Warning: this might violate the privacy of the involved users; the
    /// default shows only metadata about the communication.
    #[arg(short = 'm', long)]
    show_messages: bool,

    /// Don't ask for confirmation before deleting private messages.
    /// Make absolutely sure that you specified the correct user IDs!
    #[arg(short = 'n', long)]
    non_interactive: bool,

    /// Leave the history cache untouched.
    #[arg(long)]
    skip_cache: bool,

    /// Index pattern to search (overrides the config file).
    #[arg(long)]
    indices: Option<String>,

    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Be verbose.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Print lots of debugging statements.
    #[arg(short = 'd', long)]
    debug: bool,
}

impl Args {
    fn default_log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    observability::init_tracing(args.default_log_level());

    match run(args).await {
        Ok(Outcome::NothingToDelete | Outcome::Completed { .. }) => {}
        Ok(Outcome::Aborted) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

async fn run(args: Args) -> Result<Outcome, PurgeError> {
    let mut config = match &args.config {
        Some(path) => PurgeConfig::from_file(path)?,
        None => PurgeConfig::default(),
    };
    if let Some(indices) = &args.indices {
        config.search.index_pattern = indices.clone();
    }

    let filter = ConversationFilter::new(&args.user_a, &args.user_b, args.show_messages);
    let search = SearchClient::from_config(&config.search)?;

    let redis;
    let cache: Option<&dyn HistoryCache> = if args.skip_cache {
        None
    } else {
        redis = RedisCache::from_config(&config.cache)?;
        Some(&redis)
    };

    let interactive = !args.non_interactive;
    purge::run(
        &search,
        cache,
        &config,
        &filter,
        interactive,
        prompt_confirmation,
    )
    .await
}

/// Ask the operator to confirm deletion of the messages listed above.
fn prompt_confirmation(_outcome: &FetchOutcome) -> bool {
    print!("Do you want to delete the shown messages (type all uppercase yes)? ");
    let _ = std::io::stdout().flush();

    let mut input = String::new();
    if std::io::stdin().lock().read_line(&mut input).is_err() {
        return false;
    }
    confirmation_accepted(&input)
}

/// Only the exact case-sensitive token proceeds; anything else aborts.
fn confirmation_accepted(input: &str) -> bool {
    input.trim_end_matches(['\r', '\n']) == CONFIRMATION_TOKEN
}
