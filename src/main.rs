//! Operator CLI for the immigration admin backend.
//!
//! Lists, inspects and deletes records, scans and verifies arrival/departure
//! QR codes, and manages the stored session token. Output is JSON on stdout.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use border_admin::api::{CounterKind, Direction, ScanType};
use border_admin::config::Config;
use border_admin::errors::Result;
use border_admin::models::Lang;
use border_admin::notify::Notice;
use border_admin::store::{CursorResource, CursorStore, Filters, PageRequest, Resource, ResourceStore};
use border_admin::AdminServices;

#[derive(Debug, Parser)]
#[command(name = "border-admin", version, about = "Immigration admin backend client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List one page of a resource
    List {
        resource: ResourceKind,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Page size (defaults to ADMIN_PAGE_SIZE)
        #[arg(long)]
        limit: Option<u32>,
        /// Filter as key=value, repeatable
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
        /// Language of cursor-paginated resources
        #[arg(long, default_value = "lo")]
        lang: Lang,
        /// Cursor of cursor-paginated resources
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Show one record
    Get {
        resource: ResourceKind,
        id: i64,
        #[arg(long, default_value = "lo")]
        lang: Lang,
    },
    /// Delete one record
    Delete { resource: ResourceKind, id: i64 },
    /// Resolve a QR verification code
    Scan { scan_type: ScanType, code: String },
    /// Confirm an arrival or departure
    Verify { scan_type: ScanType, id: i64 },
    /// Show every registration counter
    Counters,
    /// Increment or decrement a registration counter
    AdjustCounter {
        kind: CounterKind,
        direction: Direction,
        /// Positive to increment, negative to decrement
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Store a bearer token for later commands
    LoginToken { token: String },
    /// Forget the stored token
    Logout,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResourceKind {
    Users,
    Roles,
    Permissions,
    Checkpoints,
    CheckpointCategories,
    Provinces,
    Countries,
    Hotels,
    News,
    NewsCategories,
    Banners,
    Popups,
    Laws,
    Feedback,
    Contacts,
    VisaCategories,
    Services,
    Arrivals,
    Departures,
}

/// Run `$call(store, args..)` against the offset-paginated store of `$kind`,
/// or `$cursor(store, args..)` against a cursor-paginated one.
macro_rules! dispatch {
    ($services:expr, $kind:expr, $call:ident($($arg:expr),*), $cursor:ident($($carg:expr),*)) => {
        match $kind {
            ResourceKind::Users => $call(&$services.users $(, $arg)*).await,
            ResourceKind::Roles => $call(&$services.roles $(, $arg)*).await,
            ResourceKind::Permissions => $call(&$services.permissions $(, $arg)*).await,
            ResourceKind::Checkpoints => $call(&$services.checkpoints $(, $arg)*).await,
            ResourceKind::CheckpointCategories => $call(&$services.checkpoint_categories $(, $arg)*).await,
            ResourceKind::Provinces => $call(&$services.provinces $(, $arg)*).await,
            ResourceKind::Countries => $call(&$services.countries $(, $arg)*).await,
            ResourceKind::Hotels => $call(&$services.hotels $(, $arg)*).await,
            ResourceKind::News => $call(&$services.news $(, $arg)*).await,
            ResourceKind::NewsCategories => $call(&$services.news_categories $(, $arg)*).await,
            ResourceKind::Banners => $call(&$services.banners $(, $arg)*).await,
            ResourceKind::Popups => $call(&$services.popups $(, $arg)*).await,
            ResourceKind::Laws => $call(&$services.laws $(, $arg)*).await,
            ResourceKind::Feedback => $call(&$services.feedback $(, $arg)*).await,
            ResourceKind::Contacts => $call(&$services.contacts $(, $arg)*).await,
            ResourceKind::Arrivals => $call(&**$services.arrivals $(, $arg)*).await,
            ResourceKind::Departures => $call(&**$services.departures $(, $arg)*).await,
            ResourceKind::VisaCategories => $cursor(&$services.visa_categories $(, $carg)*).await,
            ResourceKind::Services => $cursor(&$services.services $(, $carg)*).await,
        }
    };
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("API base URL: {}", config.base_url);

    let services = AdminServices::new(config)?;
    let mut notices = services.notifier().subscribe();

    let outcome = run(&services, cli.command).await;

    loop {
        match notices.try_recv() {
            Ok(notice) => print_notice(&notice),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    let output = outcome?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(services: &AdminServices, command: Command) -> Result<Value> {
    match command {
        Command::List {
            resource,
            offset,
            limit,
            filters,
            lang,
            cursor,
        } => {
            let filters = Filters::parse_pairs(filters.iter().map(String::as_str)).ok_or_else(|| {
                border_admin::errors::ApiError::Validation("filters must look like key=value".to_string())
            })?;
            let page = PageRequest::new(offset, limit.unwrap_or(services.config.page_size));
            dispatch!(
                services,
                resource,
                list_page(page, &filters),
                list_cursor(lang, limit, cursor.as_deref())
            )
        }
        Command::Get { resource, id, lang } => {
            dispatch!(services, resource, get_record(id), get_cursor_record(id, lang))
        }
        Command::Delete { resource, id } => {
            dispatch!(services, resource, delete_record(id), delete_cursor_record(id))
        }
        Command::Scan { scan_type, code } => {
            services.scanner.set_scan_type(scan_type);
            to_json(&services.scanner.scan(&code).await?)
        }
        Command::Verify { scan_type, id } => {
            let outcome = match scan_type {
                ScanType::Arrival => services.arrivals.verify(id).await?,
                ScanType::Departure => services.departures.verify(id).await?,
            };
            to_json(&outcome)
        }
        Command::Counters => to_json(&services.counters.fetch_all().await),
        Command::AdjustCounter {
            kind,
            direction,
            delta,
        } => {
            let counter = if delta >= 0 {
                services.counters.increment(kind, direction, delta.unsigned_abs()).await?
            } else {
                services.counters.decrement(kind, direction, delta.unsigned_abs()).await?
            };
            to_json(&counter)
        }
        Command::LoginToken { token } => {
            services.tokens().set(token)?;
            if services.config.token_path.is_none() {
                tracing::warn!("ADMIN_TOKEN_PATH is not set; the token lasts for this process only");
            }
            Ok(json!({ "logged_in": true }))
        }
        Command::Logout => {
            services.logout();
            Ok(json!({ "logged_in": false }))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

async fn list_page<R>(store: &ResourceStore<R>, page: PageRequest, filters: &Filters) -> Result<Value>
where
    R: Resource,
    R::Item: Serialize,
{
    for (name, _) in filters.iter() {
        if !R::FILTERS.iter().any(|key| key.name == name) {
            tracing::warn!(resource = R::NAME, filter = name, "Ignoring unknown filter");
        }
    }
    to_json(&store.list(page, filters).await?)
}

async fn get_record<R>(store: &ResourceStore<R>, id: i64) -> Result<Value>
where
    R: Resource,
    R::Detail: Serialize,
{
    to_json(&store.get_by_id(id).await?)
}

async fn delete_record<R: Resource>(store: &ResourceStore<R>, id: i64) -> Result<Value> {
    store.delete(id).await?;
    Ok(json!({ "deleted": id }))
}

async fn list_cursor<R>(
    store: &CursorStore<R>,
    lang: Lang,
    limit: Option<u32>,
    cursor: Option<&str>,
) -> Result<Value>
where
    R: CursorResource,
    R::Item: Serialize,
{
    to_json(&store.list(lang, limit.unwrap_or(R::DEFAULT_LIMIT), cursor).await?)
}

async fn get_cursor_record<R>(store: &CursorStore<R>, id: i64, lang: Lang) -> Result<Value>
where
    R: CursorResource,
    R::Item: Serialize,
{
    to_json(&store.get_by_id(id, lang).await?)
}

async fn delete_cursor_record<R: CursorResource>(store: &CursorStore<R>, id: i64) -> Result<Value> {
    store.delete(id).await?;
    Ok(json!({ "deleted": id }))
}

fn print_notice(notice: &Notice) {
    match notice {
        Notice::SessionExpired => eprintln!("Session expired. Run `border-admin login-token <token>`."),
        Notice::Message {
            level,
            title,
            description,
        } => eprintln!("[{:?}] {}: {}", level, title, description),
    }
}
