use super::{Command, CommandError, State};
use crate::storage::StoreError;

/// `login <name>`: record an already-registered user as current.
pub async fn login(state: &mut State, cmd: Command) -> Result<(), CommandError> {
    let name = cmd
        .args
        .first()
        .ok_or_else(|| CommandError::Usage("login <name>".to_string()))?;

    let user = state
        .db
        .get_user_by_name(name)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("user {name} is not registered")))?;

    state.config.set_user(&user.name, &state.config_path)?;
    println!("Logged in as {}", user.name);
    Ok(())
}

/// `register <name>`: create the user and log them in.
pub async fn register(state: &mut State, cmd: Command) -> Result<(), CommandError> {
    let name = cmd
        .args
        .first()
        .ok_or_else(|| CommandError::Usage("register <name>".to_string()))?;

    let user = match state.db.create_user(name).await {
        Ok(user) => user,
        Err(StoreError::Conflict) => {
            return Err(CommandError::Conflict(format!(
                "user {name} already exists"
            )))
        }
        Err(e) => return Err(e.into()),
    };

    state.config.set_user(&user.name, &state.config_path)?;
    println!("Registered user {}", user.name);
    Ok(())
}

/// `reset`: delete every user; feeds, follows, and posts cascade.
pub async fn reset(state: &mut State, _cmd: Command) -> Result<(), CommandError> {
    state.db.delete_all_users().await?;
    println!("Database reset.");
    Ok(())
}

/// `users`: list all users, marking the current one.
pub async fn list(state: &mut State, _cmd: Command) -> Result<(), CommandError> {
    for user in state.db.list_users().await? {
        if user.name == state.config.current_user_name {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}
