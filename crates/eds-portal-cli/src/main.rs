//! eds-portal - command-line front end for the enterprise data portal.
//!
//! Signs in against the portal API, keeps the session token in the OS
//! keychain, and sends requests and navigations through the same pipeline
//! and guard the web front end uses.

mod console;

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eds_portal_core::router::LOGIN_ROUTE;
use eds_portal_core::session::{KeyringStorage, MemoryStorage};
use eds_portal_core::{
    ApiClient, Config, NavigationGuard, Navigator, Notifier, OutboundCall, Persistence,
    RouteTable, Router, SessionStore,
};

use console::ConsoleNotifier;

const USAGE: &str = "\
Usage: eds-portal <command> [args]

Commands:
  login <username> [--remember]  Sign in (password is prompted); --remember
                                 keeps the session in the OS keychain
  logout                         Forget the stored session
  status                         Show who is signed in
  get <path>                     GET an API path and print the JSON body
  open <path>                    Navigate to an app route, e.g. /customers

Environment:
  EDS_API_URL   API base URL (overrides the config file)
  RUST_LOG      Log filter, e.g. RUST_LOG=debug";

/// Log file name prefix inside `log_dir`
const LOG_FILE_PREFIX: &str = "eds-portal.log";

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard when file logging is enabled; keep it alive
/// until exit so buffered lines are flushed.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Sessions outlive the process only when `--remember` is given.
fn persistence_for(args: &[String]) -> Persistence {
    if args.iter().any(|a| a == "--remember") {
        Persistence::Durable
    } else {
        Persistence::Ephemeral
    }
}

/// Everything a command needs, wired the same way as the web front end.
struct Portal {
    session: Arc<SessionStore>,
    router: Arc<Router>,
    client: ApiClient,
}

impl Portal {
    fn new(config: &Config) -> Result<Self> {
        let session = Arc::new(SessionStore::new(
            Arc::new(KeyringStorage::new()),
            Arc::new(MemoryStorage::new()),
        ));
        let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

        let routes = Arc::new(RouteTable::portal());
        let guard = NavigationGuard::new(
            routes.clone(),
            session.clone(),
            notifier.clone(),
            LOGIN_ROUTE,
        );
        let router = Arc::new(Router::new(routes, guard));
        let client = ApiClient::from_config(config, session.clone(), notifier, router.clone())?;

        Ok(Self {
            session,
            router,
            client,
        })
    }

    async fn login(&self, args: &[String]) -> Result<()> {
        let username = args
            .iter()
            .find(|a| !a.starts_with("--"))
            .context("login requires a username")?;
        let persistence = persistence_for(args);

        let password = rpassword::prompt_password("Password: ")
            .context("Failed to read password")?;
        let profile = self.client.login(username, &password, persistence).await?;

        println!("Signed in as {}", profile.username);
        if persistence == Persistence::Ephemeral {
            println!("Session kept in memory only; it ends with this process.");
        }
        Ok(())
    }

    fn logout(&self) {
        self.client.logout();
        println!("Signed out");
    }

    fn status(&self) {
        match (self.session.is_authenticated(), self.session.user()) {
            (true, Some(user)) => println!(
                "Signed in as {} (since {})",
                user.username,
                user.signed_in_at.format("%Y-%m-%d %H:%M UTC")
            ),
            (true, None) => println!("Signed in"),
            (false, _) => println!("Not signed in"),
        }
    }

    async fn get(&self, path: &str) -> Result<()> {
        let response = self.client.send(OutboundCall::get(path)).await?;
        let body = serde_json::to_string_pretty(&response.body)?;
        println!("{}", body);
        Ok(())
    }

    fn open(&self, path: &str) -> Result<()> {
        let location = self.router.navigate_path(path)?;
        if location.full_path != path {
            println!("Redirected to {}", location.full_path);
        } else {
            println!("Opened {}", location.full_path);
        }
        info!(current = %self.router.current().full_path, "Navigation finished");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let _log_guard = init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    info!(api = %config.api_base_url, command = %command, "eds-portal starting");
    let portal = Portal::new(&config)?;

    match command.as_str() {
        "login" => portal.login(rest).await,
        "logout" => {
            portal.logout();
            Ok(())
        }
        "status" => {
            portal.status();
            Ok(())
        }
        "get" => {
            let path = rest.first().context("get requires a path")?;
            portal.get(path).await
        }
        "open" => {
            let path = rest.first().context("open requires a path")?;
            portal.open(path)
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}
