use futures::future::FutureExt;

use super::{CommandError, CommandResult, Handler, State};
use crate::storage::User;

/// A handler that requires an authenticated user.
pub type AuthedHandler = for<'a> fn(&'a mut State, User, super::Command) -> CommandResult<'a>;

/// Wrap a handler that needs a user. The current user name from the config
/// is resolved against the store before the inner handler runs; an
/// unresolvable name fails with a not-found error and the inner handler is
/// never invoked, so no writes happen.
///
/// This lookup is the sole authorization check in the system; there is no
/// session or token concept.
pub fn authenticated(inner: AuthedHandler) -> Handler {
    // Named fn with explicit lifetimes; a bare async closure does not
    // reliably coerce to the higher-ranked handler signature.
    fn call<'a>(inner: AuthedHandler, state: &'a mut State, cmd: super::Command) -> CommandResult<'a> {
        async move {
            let user = resolve_current_user(state).await?;
            inner(state, user, cmd).await
        }
        .boxed()
    }
    Box::new(move |state, cmd| call(inner, state, cmd))
}

/// Resolve `config.current_user_name` to a stored user.
pub async fn resolve_current_user(state: &State) -> Result<User, CommandError> {
    let name = state.config.current_user_name.as_str();
    if name.is_empty() {
        return Err(CommandError::NotFound(
            "no user is logged in; run `creel login <name>` first".to_string(),
        ));
    }
    state
        .db
        .get_user_by_name(name)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("user {name} is not registered")))
}
