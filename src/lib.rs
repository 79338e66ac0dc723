pub mod client;
pub mod config;
pub mod model;
pub mod search;
pub mod server;
pub mod store;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use client::{
    HttpTransport, LocalTransport, Phase, QueryOrchestrator, ScrollMode, SearchTransport,
    Snapshot, SpecChange, UiEvent, cancellation_pair, spawn_session,
};
use config::{ClientConfig, ServerConfig};
use search::{SearchEngine, SearchResult, SearchSpecification, SortKey, SortOrder};
use store::{CatalogGenerator, Dataset, JsonFileProvider, RecordProvider, RecordStore};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "catalog-search",
    version,
    about = "Faceted catalog search service and debounced query client"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve GET /api/search over HTTP
    Serve {
        /// Address to bind (env: CATALOG_BIND)
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,

        /// Artificial response delay in milliseconds (env: CATALOG_LATENCY_MS)
        #[arg(long)]
        latency_ms: Option<u64>,

        /// Largest accepted page size (env: CATALOG_MAX_LIMIT)
        #[arg(long)]
        max_limit: Option<usize>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Run a single search and print the result
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Interactive query session driven by line commands on stdin
    Watch {
        /// paged or infinite (env: CATALOG_SCROLL_MODE)
        #[arg(long, value_enum)]
        mode: Option<ScrollMode>,

        /// Debounce interval in milliseconds (env: CATALOG_DEBOUNCE_MS)
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Page size (env: CATALOG_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<usize>,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Write a generated catalog as JSON, loadable with --data
    Generate {
        #[arg(long, value_enum, default_value_t = Dataset::Products)]
        dataset: Dataset,

        /// Number of records (defaults per dataset)
        #[arg(long)]
        records: Option<usize>,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Where records come from when searching in-process or serving.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// JSON record file (env: CATALOG_DATA)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Generated dataset when no file is given (env: CATALOG_DATASET)
    #[arg(long, value_enum)]
    pub dataset: Option<Dataset>,

    /// Generated record count (env: CATALOG_RECORDS)
    #[arg(long)]
    pub records: Option<usize>,

    /// Generator seed (env: CATALOG_SEED)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SourceArgs {
    fn apply(&self, cfg: &mut ServerConfig) {
        if let Some(path) = &self.data {
            cfg.data_path = Some(path.clone());
        }
        if let Some(dataset) = self.dataset {
            cfg.dataset = dataset;
            cfg.record_count = dataset.default_count();
        }
        if let Some(n) = self.records {
            cfg.record_count = n;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
    }
}

/// Remote service or in-process engine.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Search service base URL (env: CATALOG_URL)
    #[arg(long, conflicts_with = "local")]
    pub url: Option<String>,

    /// Search an in-process catalog instead of a running service
    #[arg(long)]
    pub local: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Free-text query
    #[arg(default_value = "")]
    pub query: String,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, default_value_t = 12)]
    pub limit: usize,

    /// Category filter ("all" for none)
    #[arg(long, default_value = "")]
    pub category: String,

    /// Brand filter ("all" for none)
    #[arg(long, default_value = "")]
    pub brand: String,

    #[arg(long)]
    pub min_price: Option<u64>,

    #[arg(long)]
    pub max_price: Option<u64>,

    /// name, price, rating or date
    #[arg(long, default_value = "name")]
    pub sort: String,

    /// asc or desc
    #[arg(long, default_value = "asc")]
    pub order: String,
}

impl QueryArgs {
    pub fn to_spec(&self) -> SearchSpecification {
        let defaults = SearchSpecification::default();
        SearchSpecification::default()
            .with_query(self.query.clone())
            .with_page(self.page)
            .with_limit(self.limit)
            .with_category(strip_all(&self.category))
            .with_brand(strip_all(&self.brand))
            .with_price_range(
                self.min_price.unwrap_or(defaults.min_price),
                self.max_price.unwrap_or(defaults.max_price),
            )
            .with_sort(
                SortKey::parse_lenient(&self.sort),
                SortOrder::parse_lenient(&self.order),
            )
    }
}

fn strip_all(value: &str) -> String {
    if value.eq_ignore_ascii_case(client::orchestrator::ALL_SENTINEL) {
        String::new()
    } else {
        value.to_string()
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            latency_ms,
            max_limit,
            source,
        } => {
            let mut cfg = ServerConfig::from_env();
            source.apply(&mut cfg);
            if let Some(bind) = bind {
                cfg.bind = bind;
            }
            if let Some(ms) = latency_ms {
                cfg.latency = Duration::from_millis(ms);
            }
            if let Some(n) = max_limit {
                cfg.max_limit = n.max(1);
            }
            let engine = Arc::new(load_engine(&cfg)?);
            server::serve(&cfg, engine).await?;
            Ok(())
        }
        Commands::Search {
            query,
            json,
            target,
        } => run_search(query.to_spec(), json, &target).await,
        Commands::Watch {
            mode,
            debounce_ms,
            page_size,
            target,
        } => {
            let mut cfg = ClientConfig::from_env();
            if let Some(mode) = mode {
                cfg.scroll_mode = mode;
            }
            if let Some(ms) = debounce_ms {
                cfg.debounce = Duration::from_millis(ms);
            }
            if let Some(n) = page_size {
                cfg.page_size = n.max(1);
            }
            run_watch(cfg, &target).await
        }
        Commands::Generate {
            dataset,
            records,
            seed,
            out,
        } => {
            let count = records.unwrap_or_else(|| dataset.default_count());
            let catalog = CatalogGenerator::new(dataset, count, seed).generate();
            let body = serde_json::to_string_pretty(&catalog)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, body)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), records = count, "catalog written");
                }
                None => println!("{body}"),
            }
            Ok(())
        }
    }
}

/// Build a search engine from the configured record source.
pub fn load_engine(cfg: &ServerConfig) -> Result<SearchEngine> {
    let provider: Box<dyn RecordProvider> = match &cfg.data_path {
        Some(path) => Box::new(JsonFileProvider::new(path)),
        None => Box::new(CatalogGenerator::new(cfg.dataset, cfg.record_count, cfg.seed)),
    };
    let store = RecordStore::from_provider(provider.as_ref())
        .with_context(|| format!("loading records from {}", provider.describe()))?;
    Ok(SearchEngine::new(store))
}

fn local_engine(source: &SourceArgs) -> Result<Arc<SearchEngine>> {
    let mut cfg = ServerConfig::from_env();
    source.apply(&mut cfg);
    Ok(Arc::new(load_engine(&cfg)?))
}

fn http_transport(target: &TargetArgs, cfg: &ClientConfig) -> Result<HttpTransport> {
    let base = target
        .url
        .as_deref()
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| cfg.base_url.clone());
    HttpTransport::new(&base, cfg.request_timeout).context("building HTTP client")
}

async fn run_search(spec: SearchSpecification, json: bool, target: &TargetArgs) -> Result<()> {
    validate_target(target)?;
    let result = if target.local {
        local_engine(&target.source)?.execute(&spec)
    } else {
        let cfg = ClientConfig::from_env();
        let transport = http_transport(target, &cfg)?;
        let (token, _handle) = cancellation_pair();
        transport
            .search(spec, token)
            .await
            .map_err(|e| anyhow!("{}: {e}", e.user_message()))?
    };

    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &result)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render_table(&result))?;
    }
    Ok(())
}

/// Plain-text listing of one result page.
pub fn render_table(result: &SearchResult) -> String {
    let mut text = String::new();
    for record in &result.results {
        let price = record
            .price
            .map(|p| format!("{p:>9.2}"))
            .unwrap_or_else(|| format!("{:>9}", "-"));
        let rating = record
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        text.push_str(&format!(
            "{:<10} {:<40} {:<14} {} {:>4}\n",
            record.id, record.name, record.category, price, rating
        ));
    }
    let p = &result.pagination;
    text.push_str(&format!(
        "page {}/{} ({} results)\n",
        p.current_page, p.total_pages, p.total_count
    ));
    text
}

async fn run_watch(cfg: ClientConfig, target: &TargetArgs) -> Result<()> {
    validate_target(target)?;
    let spec = SearchSpecification::default().with_limit(cfg.page_size);
    let orchestrator = QueryOrchestrator::new(spec, cfg.scroll_mode, cfg.debounce);
    let settle = cfg.debounce + cfg.request_timeout;
    if target.local {
        let transport = LocalTransport::new(local_engine(&target.source)?);
        watch_loop(orchestrator, Arc::new(transport), settle).await
    } else {
        let transport = http_transport(target, &cfg)?;
        watch_loop(orchestrator, Arc::new(transport), settle).await
    }
}

async fn watch_loop<T: SearchTransport>(
    orchestrator: QueryOrchestrator,
    transport: Arc<T>,
    settle: Duration,
) -> Result<()> {
    let session = spawn_session(orchestrator, transport);
    let mut snapshots = session.snapshots();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_rendered = String::new();
    let mut sent = 0u64;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(UiEvent::Shutdown)) => break,
                    Ok(Some(event)) => {
                        if !session.send(event).await {
                            break;
                        }
                        sent += 1;
                    }
                    Err(msg) => eprintln!("{msg}"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let rendered = render_snapshot(&snapshots.borrow_and_update());
                print_if_new(&mut last_rendered, rendered);
            }
        }
    }

    // Input closed: let pending work settle so piped scripts see their results.
    let _ = tokio::time::timeout(
        settle,
        snapshots.wait_for(|s| s.processed >= sent && s.phase == Phase::Idle),
    )
    .await;
    let rendered = render_snapshot(&snapshots.borrow());
    print_if_new(&mut last_rendered, rendered);

    let stats = session.shutdown().await?;
    info!(
        issued = stats.issued,
        applied = stats.applied,
        stale = stats.stale,
        failed = stats.failed,
        "watch session finished"
    );
    Ok(())
}

fn print_if_new(last: &mut String, rendered: String) {
    if *last != rendered {
        print!("{rendered}");
        let _ = std::io::stdout().flush();
        *last = rendered;
    }
}

/// Parse one `watch` input line.
///
/// ```text
/// query <text>        category <name|all>     brand <name|all>
/// price <min> <max>   sort <key> [asc|desc]   page <n>
/// more   reset   refresh   quit
/// ```
///
/// A line without a known command word is treated as a query.
pub fn parse_command(line: &str) -> std::result::Result<Option<UiEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let event = match word.to_ascii_lowercase().as_str() {
        "query" | "q" => UiEvent::Change(SpecChange::Query(rest.to_string())),
        "category" => UiEvent::Change(SpecChange::Category(rest.to_string())),
        "brand" => UiEvent::Change(SpecChange::Brand(rest.to_string())),
        "price" => {
            let mut parts = rest.split_whitespace().map(str::parse::<u64>);
            match (parts.next(), parts.next()) {
                (Some(Ok(min)), Some(Ok(max))) => {
                    UiEvent::Change(SpecChange::PriceRange { min, max })
                }
                _ => return Err("usage: price <min> <max>".to_string()),
            }
        }
        "sort" => {
            let mut parts = rest.split_whitespace();
            let Some(key) = parts.next() else {
                return Err("usage: sort <name|price|rating|date> [asc|desc]".to_string());
            };
            UiEvent::Change(SpecChange::Sort {
                key: SortKey::parse_lenient(key),
                order: SortOrder::parse_lenient(parts.next().unwrap_or("asc")),
            })
        }
        "page" => match rest.parse::<usize>() {
            Ok(page) if page >= 1 => UiEvent::Change(SpecChange::Page(page)),
            _ => return Err("usage: page <n>".to_string()),
        },
        "more" => UiEvent::LoadMore,
        "reset" => UiEvent::Change(SpecChange::ResetFilters),
        "refresh" => UiEvent::Refresh,
        "quit" | "exit" => UiEvent::Shutdown,
        _ => UiEvent::Change(SpecChange::Query(line.to_string())),
    };
    Ok(Some(event))
}

/// Text shown for one session snapshot.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let display = &snapshot.display;
    let mut text = String::new();
    let status = match snapshot.phase {
        Phase::Idle => "idle",
        Phase::Debouncing => "typing",
        Phase::InFlight => "loading",
    };
    text.push_str(&format!(
        "-- [{status}] query={:?} category={:?} brand={:?} price={}..{} sort={} {}\n",
        snapshot.spec.query,
        snapshot.spec.category,
        snapshot.spec.brand,
        snapshot.spec.min_price,
        snapshot.spec.max_price,
        snapshot.spec.sort_by.as_str(),
        snapshot.spec.sort_order.as_str(),
    ));
    if let Some(error) = &display.error {
        text.push_str(&format!("error: {error}\n"));
    }
    if snapshot.phase == Phase::Idle
        && let Some(p) = &display.pagination
    {
        if p.total_count == 0 {
            text.push_str("no results\n");
        }
        for record in &display.results {
            text.push_str(&format!("  {:<10} {}\n", record.id, record.name));
        }
        text.push_str(&format!(
            "page {}/{} showing {} of {}{}\n",
            p.current_page,
            p.total_pages,
            display.results.len(),
            p.total_count,
            if p.has_more { " (more)" } else { "" }
        ));
    }
    text
}

/// Fail early with a clear message when a flag combination cannot work.
pub fn validate_target(target: &TargetArgs) -> Result<()> {
    if !target.local && target.source.data.is_some() {
        bail!("--data only applies with --local");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_command_maps_words_to_events() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(
            parse_command("category all").unwrap(),
            Some(UiEvent::Change(SpecChange::Category("all".into())))
        );
        assert_eq!(
            parse_command("price 100 500").unwrap(),
            Some(UiEvent::Change(SpecChange::PriceRange { min: 100, max: 500 }))
        );
        assert_eq!(
            parse_command("sort price desc").unwrap(),
            Some(UiEvent::Change(SpecChange::Sort {
                key: SortKey::Price,
                order: SortOrder::Desc
            }))
        );
        assert_eq!(parse_command("more").unwrap(), Some(UiEvent::LoadMore));
        assert_eq!(parse_command("quit").unwrap(), Some(UiEvent::Shutdown));
        assert_eq!(
            parse_command("wireless mouse").unwrap(),
            Some(UiEvent::Change(SpecChange::Query("wireless mouse".into())))
        );
        assert!(parse_command("price ten").is_err());
        assert!(parse_command("page 0").is_err());
    }

    #[test]
    fn query_args_strip_all_sentinel() {
        let cli = Cli::parse_from([
            "catalog-search",
            "search",
            "lamp",
            "--category",
            "all",
            "--min-price",
            "500",
            "--max-price",
            "100",
        ]);
        let Commands::Search { query, .. } = cli.command else {
            panic!("expected search");
        };
        let spec = query.to_spec();
        assert_eq!(spec.query, "lamp");
        assert!(spec.category.is_empty());
        assert_eq!((spec.min_price, spec.max_price), (100, 500));
    }

    #[test]
    fn data_requires_local() {
        let target = TargetArgs {
            source: SourceArgs {
                data: Some(PathBuf::from("catalog.json")),
                ..SourceArgs::default()
            },
            ..TargetArgs::default()
        };
        assert!(validate_target(&target).is_err());
    }
}
