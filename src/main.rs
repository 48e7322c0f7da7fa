use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::{env, path::PathBuf};
use tenderfeed::{
    config::Config,
    export::write_export,
    fetch::{build_client, fetch_feed},
    process::Record,
    query::{QueryState, SortDirection, SortSpec},
    render::{describe_query, render_view},
    schema::LogicalField,
    session::{Debouncer, FetchOutcome, FetchTicket, Session},
    TenderError,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::{self, UnboundedSender},
};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Search, sort and export open tender notices.
#[derive(Parser)]
#[command(name = "tenderfeed", version, long_about = None)]
struct Cli {
    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read the feed from a local CSV file instead of the network.
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Override the feed URL.
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the feed once, print the matching tenders, optionally export them.
    Query {
        /// Case-insensitive text matched against every column.
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort column: title, contractingEntityName or publicationDate.
        #[arg(long)]
        sort: Option<LogicalField>,

        /// Sort descending instead of ascending.
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Write the result as CSV to this file.
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Print at most this many tenders.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Line-driven session: type to search, `:help` for commands.
    Interactive {
        /// Tenders shown after each update.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

/// Where feed text comes from.
#[derive(Clone)]
struct Source {
    client: Client,
    config: Config,
    input: Option<PathBuf>,
}

impl Source {
    async fn load(&self) -> tenderfeed::Result<String> {
        match &self.input {
            Some(path) => {
                debug!(path = %path.display(), "reading local feed");
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| TenderError::io(path, e))?;
                String::from_utf8(bytes).map_err(|e| {
                    TenderError::Parse(format!("{} is not valid UTF-8: {}", path.display(), e))
                })
            }
            None => fetch_feed(&self.client, &self.config).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(url) = cli.url {
        config.feed_url = url;
        config = config.validate()?;
    }
    let source = Source {
        client: build_client(&config)?,
        config,
        input: cli.input,
    };

    match cli.command {
        Command::Query {
            search,
            sort,
            desc,
            export,
            json,
            limit,
        } => {
            let mut query = QueryState::new().with_search(search);
            if let Some(field) = sort {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                query = query.with_sort(SortSpec::new(field, direction)?);
            }
            run_once(&source, query, export, json, limit).await
        }
        Command::Interactive { limit } => run_interactive(source, limit).await,
    }
}

async fn run_once(
    source: &Source,
    query: QueryState,
    export: Option<PathBuf>,
    json: bool,
    limit: Option<usize>,
) -> Result<()> {
    let mut session = Session::with_query(query);
    let ticket = session.begin_fetch();
    let fetched = source.load().await;
    session
        .complete_fetch(ticket, fetched)
        .context("loading tender feed")?;

    let view = session.view();
    let shown = &view[..limit.unwrap_or(view.len()).min(view.len())];
    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
    } else {
        print!("{}", render_view(shown, session.query()));
        println!("{} of {} tenders match", view.len(), session.table().len());
    }

    if let Some(path) = export {
        let rows = write_export(&path, view.iter().copied())
            .with_context(|| format!("exporting to {}", path.display()))?;
        info!(rows, path = %path.display(), "exported");
    }
    Ok(())
}

/// A line typed in the interactive session.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Search(String),
    Sort(String),
    Clear,
    Refresh,
    Export(Option<PathBuf>),
    Show,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let Some(cmd) = line.trim().strip_prefix(':') else {
        return Input::Search(line.to_string());
    };
    let (name, arg) = match cmd.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (cmd, ""),
    };
    match name {
        "sort" => Input::Sort(arg.to_string()),
        "clear" => Input::Clear,
        "refresh" => Input::Refresh,
        "export" if arg.is_empty() => Input::Export(None),
        "export" => Input::Export(Some(PathBuf::from(arg))),
        "show" => Input::Show,
        "help" => Input::Help,
        "quit" | "q" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

const HELP: &str = "\
type text to search; commands:
  :sort FIELD    sort by title | contractingEntityName | publicationDate (again to flip)
  :sort          remove the sort
  :clear         clear the search
  :refresh       reload the feed
  :export [FILE] write the current results as CSV
  :show          print the current results
  :quit";

fn spawn_refresh(
    session: &mut Session,
    source: &Source,
    tx: &UnboundedSender<(FetchTicket, tenderfeed::Result<String>)>,
) {
    let ticket = session.begin_fetch();
    let source = source.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let fetched = source.load().await;
        let _ = tx.send((ticket, fetched));
    });
}

fn show(session: &Session, limit: usize) {
    let view: Vec<&Record> = session.view();
    let shown = &view[..limit.min(view.len())];
    print!("{}", render_view(shown, session.query()));
    match session.last_refreshed() {
        Some(at) => println!(
            "{} of {} tenders match, {} (last refreshed: {})",
            view.len(),
            session.table().len(),
            describe_query(session.query()),
            at.format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("no data loaded yet"),
    }
    if let Some(msg) = session.last_error() {
        println!("Error: {}", msg);
    }
}

async fn run_interactive(source: Source, limit: usize) -> Result<()> {
    let mut session = Session::new();
    let (mut debouncer, mut searches) = Debouncer::new(source.config.debounce());
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    spawn_refresh(&mut session, &source, &fetch_tx);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                match parse_input(&line) {
                    Input::Search(text) => debouncer.push(text),
                    Input::Sort(name) if name.is_empty() => {
                        session.clear_sort();
                        show(&session, limit);
                    }
                    Input::Sort(name) => {
                        match name.parse::<LogicalField>().and_then(|f| session.toggle_sort(f)) {
                            Ok(_) => show(&session, limit),
                            Err(e) => println!("{}", e),
                        }
                    }
                    Input::Clear => {
                        debouncer.cancel();
                        session.clear_search();
                        show(&session, limit);
                    }
                    Input::Refresh => spawn_refresh(&mut session, &source, &fetch_tx),
                    Input::Export(path) => {
                        let path = path.unwrap_or_else(|| PathBuf::from(&source.config.export_file));
                        match write_export(&path, session.view()) {
                            Ok(rows) => println!("wrote {} rows to {}", rows, path.display()),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    Input::Show => show(&session, limit),
                    Input::Help => println!("{}", HELP),
                    Input::Quit => break,
                    Input::Unknown(cmd) => println!("unknown command :{} (try :help)", cmd),
                }
            }
            Some(search) = searches.recv() => {
                session.set_search(search);
                show(&session, limit);
            }
            Some((ticket, fetched)) = fetch_rx.recv() => {
                match session.complete_fetch(ticket, fetched) {
                    Ok(FetchOutcome::Installed { rows }) => {
                        info!(rows, "feed loaded");
                        show(&session, limit);
                    }
                    Ok(FetchOutcome::Stale) => debug!("ignored stale refresh"),
                    Err(e) => {
                        warn!(error = %e, "refresh failed");
                        show(&session, limit);
                    }
                }
            }
        }
    }

    debouncer.cancel();
    Ok(())
}
