use std::{io::BufRead, time::Duration};

use clap::Parser;
use dicemaster::prelude::*;
use serde::Serialize;

mod render;

use render::Card;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Queries to answer, e.g. "Stealth A 1d20+2>15". Read one per line from stdin when omitted
    queries: Vec<String>,

    /// Ethereum JSON-RPC endpoint used as the entropy source (overrides ETH_RPC_URL)
    #[arg(long, value_name = "URL")]
    rpc_url: Option<String>,

    /// Seconds before the cached block hash is refreshed
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Timeout for a block hash request, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Maximum number of dice in a single roll
    #[arg(long)]
    max_dice_count: Option<u32>,

    /// Maximum number of faces per die
    #[arg(long)]
    max_dice_faces: Option<u32>,

    /// Print the answers as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Response {
    query: String,
    cards: Vec<Card>,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(url) = &args.rpc_url {
        config.eth_rpc_url = Some(url.clone());
    }
    if let Some(secs) = args.refresh_secs {
        config.refresh_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(max) = args.max_dice_count {
        config.limits.max_dice_count = max;
    }
    if let Some(max) = args.max_dice_faces {
        config.limits.max_dice_faces = max;
    }
    Ok(config)
}

fn respond<S: EntropySource>(dm: &DiceMaster<S>, query: &str) -> anyhow::Result<Response> {
    log::info!("User query {:?}", query);
    let limits = dm.limits();
    let cards = match dm.answer(query) {
        Ok(answer) => render::answer_cards(&answer, &limits)?,
        Err(e) => {
            log::warn!("Rejected query {:?}: {}", query, e);
            render::error_cards(&e, query, &limits)
        }
    };
    Ok(Response {
        query: query.to_string(),
        cards,
    })
}

fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
    if let Err(e) = dotenv {
        log::warn!("No .env file loaded: {}", e);
    }

    let config = load_config(&args)?;
    log::info!(
        "Starting dice master: refresh every {:?}, limits {:?}",
        config.refresh_interval,
        config.limits
    );
    let dm = DiceMaster::from_config(&config)?;

    let queries = if args.queries.is_empty() {
        let mut lines = Vec::new();
        for line in std::io::stdin().lock().lines() {
            lines.push(line?);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    } else {
        args.queries.clone()
    };

    let dm = &dm;
    let responses: Vec<Response> = std::thread::scope(|scope| {
        let handles: Vec<_> = queries
            .iter()
            .map(|query| scope.spawn(move || respond(dm, query)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("Query thread panicked"))
                    .and_then(|response| response)
            })
            .collect::<anyhow::Result<_>>()
    })?;

    if args.json {
        let stdout = std::io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &responses)?;
        println!();
    } else {
        for response in &responses {
            println!("> {}", response.query);
            for card in &response.cards {
                println!("== {} ==", card.title);
                println!("({})", card.description);
                println!("{}\n", card.text);
            }
        }
    }

    Ok(())
}
