//! Command dispatch for the CLI surface.
//!
//! The registry is an explicit object built at startup and handed to the
//! dispatcher; there is no process-wide singleton. Handlers are async
//! functions over the shared [`State`]; commands that mutate subscriptions
//! are wrapped by [`auth::authenticated`], which resolves the current user
//! from the config through the store.

mod aggregate;
mod auth;
mod feeds;
mod users;

use std::collections::HashMap;
use std::path::PathBuf;

use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::feed::FetchError;
use crate::storage::{Database, StoreError, User};

pub use auth::resolve_current_user;

// ============================================================================
// State and Command
// ============================================================================

/// Everything a handler needs: the store, the HTTP client, and the config
/// with the path it persists to.
pub struct State {
    pub db: Database,
    pub http: reqwest::Client,
    pub config: Config,
    pub config_path: PathBuf,
}

/// A parsed invocation: command name plus its positional arguments.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Command failures, mapped to exit code 1 by main.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command name is not registered
    #[error("Unknown command: {0}")]
    Unknown(String),

    /// Missing or malformed arguments
    #[error("usage: {0}")]
    Usage(String),

    /// A user or feed lookup missed
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the operation
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

// ============================================================================
// Registry
// ============================================================================

pub type CommandResult<'a> = BoxFuture<'a, Result<(), CommandError>>;

/// A registered handler. Boxed so the auth wrapper can close over the
/// handler it decorates.
pub type Handler = Box<dyn for<'a> Fn(&'a mut State, Command) -> CommandResult<'a> + Send + Sync>;

/// Name-to-handler mapping, constructed once at startup.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, handler: Handler) {
        self.handlers.insert(name, handler);
    }

    /// Look up and invoke the handler for `cmd`. An unregistered name is
    /// its own error class so main can report it distinctly.
    pub async fn run(&self, state: &mut State, cmd: Command) -> Result<(), CommandError> {
        match self.handlers.get(cmd.name.as_str()) {
            Some(handler) => handler(state, cmd).await,
            None => Err(CommandError::Unknown(cmd.name)),
        }
    }
}

/// Build the full CLI registry.
pub fn default_registry() -> CommandRegistry {
    fn plain(f: for<'a> fn(&'a mut State, Command) -> CommandResult<'a>) -> Handler {
        Box::new(move |state, cmd| f(state, cmd))
    }

    let mut registry = CommandRegistry::new();
    registry.register("login", plain(login));
    registry.register("register", plain(register));
    registry.register("reset", plain(reset));
    registry.register("users", plain(list_users));
    registry.register("agg", plain(agg));
    registry.register("feeds", plain(list_feeds));
    registry.register("addfeed", auth::authenticated(add_feed));
    registry.register("follow", auth::authenticated(follow));
    registry.register("following", auth::authenticated(following));
    registry.register("unfollow", auth::authenticated(unfollow));
    registry.register("browse", auth::authenticated(browse));
    registry
}

// Boxing shims: fn items coerce to the higher-ranked pointers the registry
// stores, which closures over async fns do not reliably do.

fn login(state: &mut State, cmd: Command) -> CommandResult<'_> {
    users::login(state, cmd).boxed()
}
fn register(state: &mut State, cmd: Command) -> CommandResult<'_> {
    users::register(state, cmd).boxed()
}
fn reset(state: &mut State, cmd: Command) -> CommandResult<'_> {
    users::reset(state, cmd).boxed()
}
fn list_users(state: &mut State, cmd: Command) -> CommandResult<'_> {
    users::list(state, cmd).boxed()
}
fn agg(state: &mut State, cmd: Command) -> CommandResult<'_> {
    aggregate::run(state, cmd).boxed()
}
fn list_feeds(state: &mut State, cmd: Command) -> CommandResult<'_> {
    feeds::list(state, cmd).boxed()
}
fn add_feed(state: &mut State, user: User, cmd: Command) -> CommandResult<'_> {
    feeds::add_feed(state, user, cmd).boxed()
}
fn follow(state: &mut State, user: User, cmd: Command) -> CommandResult<'_> {
    feeds::follow(state, user, cmd).boxed()
}
fn following(state: &mut State, user: User, cmd: Command) -> CommandResult<'_> {
    feeds::following(state, user, cmd).boxed()
}
fn unfollow(state: &mut State, user: User, cmd: Command) -> CommandResult<'_> {
    feeds::unfollow(state, user, cmd).boxed()
}
fn browse(state: &mut State, user: User, cmd: Command) -> CommandResult<'_> {
    feeds::browse(state, user, cmd).boxed()
}
