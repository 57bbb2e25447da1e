//! User management command handlers

use crate::config::Config;
use crate::db::Store;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}

pub async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let users = store.list_users().await?;

    if users.is_empty() {
        println!("No registered users.");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let topics = store.count_topics_for_owner(user.id).await.unwrap_or(0);
        let last_login = user
            .last_login
            .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());

        println!("{} (ID: {})", user.username, user.id);
        println!(
            "  Joined: {} | Last login: {} | Topics: {}",
            user.date_joined.format("%Y-%m-%d"),
            last_login,
            topics
        );
    }

    Ok(())
}

pub async fn cmd_user_delete(config: &Config, username: &str, yes: bool) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let Some(user) = store.get_user_by_username(username).await? else {
        println!("User '{username}' not found.");
        println!("Use 'learning-log users list' to see usernames.");
        return Ok(());
    };

    if !yes {
        let topics = store.count_topics_for_owner(user.id).await?;
        println!(
            "Delete '{}' (ID: {}) and their {} topic(s) with all entries?",
            user.username, user.id, topics
        );
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if store.delete_user(user.id).await? {
        println!("✓ Deleted: {}", user.username);
    } else {
        println!("Failed to delete user.");
    }

    Ok(())
}
