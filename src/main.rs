// src/main.rs
use std::env;
use std::error::Error;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::Utc;
use crossbeam_channel::{after, never, select, unbounded, Receiver};

use feed_search::cache::{FileStorage, HistoryStorage, MemoryStorage};
use feed_search::catalog::{Catalog, CatalogSource};
use feed_search::query::Settlement;
use feed_search::remote::RemoteSource;
use feed_search::render::{output_view, SearchView};
use feed_search::tabs::{SearchTab, TabBar};
use feed_search::worker::{QueryDispatcher, SearchWorker};
use feed_search::{SearchConfig, SearchSession, SearchSource};

const USAGE: &str = "usage: feed_search <catalog.json> (or set search_endpoint)
lines are keywords; commands start with ':' (:replay, :retry, :tab, :clear-history, :quit);
start a line with '::' to search for a keyword beginning with ':'";

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// The whole input box now reads this
    Keyword(String),
    /// Recent entry by 1-based position
    ReplayIndex(usize),
    ReplayTerm(String),
    Retry,
    Tab(SearchTab),
    ClearHistory,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Keyword(line.to_string()));
    };
    // "::" escapes a leading colon
    if rest.starts_with(':') {
        return Ok(Command::Keyword(rest.to_string()));
    }

    let (name, arg) = match rest.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "replay" if arg.is_empty() => Err("replay needs a position or a term".to_string()),
        "replay" => Ok(match arg.parse::<usize>() {
            Ok(position) if position > 0 => Command::ReplayIndex(position),
            _ => Command::ReplayTerm(arg.to_string()),
        }),
        "retry" => Ok(Command::Retry),
        "tab" => SearchTab::parse(arg)
            .map(Command::Tab)
            .ok_or_else(|| format!("unknown tab '{}'", arg)),
        "clear-history" => Ok(Command::ClearHistory),
        "quit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command ':{}'", other)),
    }
}

/// Forward stdin lines to the event loop; the channel closes on EOF.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Could not read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

fn open_source(config: &SearchConfig) -> Result<Arc<dyn SearchSource>, Box<dyn Error>> {
    if let Some(endpoint) = &config.search_endpoint {
        log::debug!("Searching remote endpoint {}", endpoint);
        return Ok(Arc::new(RemoteSource::new(endpoint)?));
    }

    let path = env::args().nth(1).ok_or(USAGE)?;
    let catalog = Catalog::load(Path::new(&path))?;
    let source = CatalogSource::new(catalog);
    log::debug!("Loaded {} catalog entries from {}", source.len(), path);
    Ok(Arc::new(source))
}

fn open_storage(config: &SearchConfig) -> Box<dyn HistoryStorage> {
    match FileStorage::in_data_dir(&config.history_namespace) {
        Ok(storage) => {
            log::debug!("Recent searches stored in {}", storage.path().display());
            Box::new(storage)
        }
        Err(e) => {
            log::warn!("{}; recent searches will not survive this session", e);
            Box::new(MemoryStorage::new())
        }
    }
}

/// Apply a command. Returns false when the session should end.
fn apply<D, S>(
    command: Command,
    session: &mut SearchSession<D, S>,
    tabs: &mut TabBar<SearchTab>,
) -> bool
where
    D: QueryDispatcher,
    S: HistoryStorage,
{
    let now = Instant::now();
    match command {
        Command::Keyword(keyword) => session.set_keyword(keyword, now),
        Command::ReplayIndex(position) => {
            if session.replay_index(position - 1, now).is_none() {
                log::warn!("No recent search at position {}", position);
            }
        }
        Command::ReplayTerm(term) => session.replay(&term, now),
        Command::Retry => session.retry(),
        Command::Tab(tab) => {
            tabs.select(tab);
        }
        Command::ClearHistory => session.clear_recent(),
        Command::Quit => return false,
    }
    true
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let start = Instant::now();

    let config = SearchConfig::from_env();
    log::debug!("Configuration: {:?}", config);

    let source = open_source(&config)?;
    let (worker, completions) = SearchWorker::new(source);
    let mut session = SearchSession::new(&config, worker, open_storage(&config));
    let mut tabs = SearchTab::bar();

    let mut inputs = spawn_stdin_reader();
    let mut input_open = true;

    output_view(&SearchView::build(&session, &tabs, Utc::now()))?;

    loop {
        // Once input is exhausted, drain pending work and stop
        if !input_open && session.next_deadline().is_none() && !session.result().is_fetching()
        {
            break;
        }

        let timer = match session.next_deadline() {
            Some(deadline) => after(deadline.saturating_duration_since(Instant::now())),
            None => never(),
        };

        // None ends the session, Some(true) means the view changed
        let outcome = select! {
            recv(inputs) -> line => match line {
                Ok(line) => match parse_command(&line) {
                    Ok(command) => apply(command, &mut session, &mut tabs).then_some(true),
                    Err(e) => {
                        eprintln!("{}", e);
                        Some(false)
                    }
                },
                Err(_) => {
                    input_open = false;
                    Some(false)
                }
            },
            recv(completions) -> completion => match completion {
                Ok(completion) => {
                    Some(session.settle(completion, Instant::now()) != Settlement::Stale)
                }
                Err(_) => Some(false),
            },
            recv(timer) -> _ => Some(session.tick(Instant::now())),
        };

        match outcome {
            None => break,
            Some(true) => output_view(&SearchView::build(&session, &tabs, Utc::now()))?,
            Some(false) => {}
        }

        if !input_open {
            inputs = never();
        }
    }

    session.close();
    log::debug!("Session ended after {:?}", start.elapsed());
    Ok(())
}
