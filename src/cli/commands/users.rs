//! Account management command handlers

use crate::config::Config;
use crate::entities::accounts::Role;
use crate::listing::{self, ListView};
use crate::services::{
    AccountError, AccountService, CreateAccount, PointsOp, SeaOrmAccountService,
};

fn parse_role(role: &str) -> Option<Role> {
    match role.to_lowercase().as_str() {
        "user" => Some(Role::User),
        "supervisor" => Some(Role::Supervisor),
        "superadmin" => Some(Role::Superadmin),
        _ => None,
    }
}

fn parse_op(op: &str) -> Option<PointsOp> {
    match op.to_lowercase().as_str() {
        "add" => Some(PointsOp::Add),
        "remove" => Some(PointsOp::Remove),
        "set" => Some(PointsOp::Set),
        _ => None,
    }
}

pub async fn cmd_user_list(
    config: &Config,
    search: Option<&str>,
    page: usize,
) -> anyhow::Result<()> {
    let (store, actor) = super::open_store(config).await?;
    let service = SeaOrmAccountService::new(store, config.auth.clone());

    let accounts = service.list_accounts(&actor).await?;

    let mut view = ListView::new(listing::DEFAULT_PAGE_SIZE);
    view.set_filter(search.unwrap_or_default());

    let filtered: Vec<_> = accounts
        .into_iter()
        .filter(|account| {
            listing::matches_filter(account.full_name.as_deref(), &account.username, view.filter())
        })
        .collect();

    if filtered.is_empty() {
        if view.filter().is_empty() {
            println!("No accounts yet.");
            println!();
            println!("Create one with: merits users create <username>");
        } else {
            println!("No accounts match '{}'.", view.filter());
        }
        return Ok(());
    }

    view.set_page(page, filtered.len());
    let total_pages = listing::page_count(filtered.len(), view.page_size());

    println!(
        "Accounts (page {}/{}, {} total)",
        view.page(),
        total_pages,
        filtered.len()
    );
    println!("{:-<70}", "");

    for account in view.slice(&filtered) {
        println!("• {} ({})", account.display_name(), account.username);
        println!(
            "  Role: {} | Points: {} | Since: {}",
            account.role.display_name(),
            account.points,
            account.created_at
        );
    }

    if total_pages > 1 {
        println!();
        println!("Use '--page <n>' to see other pages");
    }

    Ok(())
}

pub async fn cmd_user_create(
    config: &Config,
    username: &str,
    name: Option<&str>,
    role_str: &str,
    points: i64,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let Some(role) = parse_role(role_str) else {
        println!("Unknown role: {role_str}");
        println!("Valid roles: user, supervisor, superadmin");
        return Ok(());
    };

    let (store, actor) = super::open_store(config).await?;
    let service = SeaOrmAccountService::new(store, config.auth.clone());

    let new = CreateAccount {
        username: username.to_string(),
        password: password.map(ToString::to_string),
        full_name: name.map(ToString::to_string),
        role,
        points,
    };

    match service.create_account(&actor, new).await {
        Ok(created) => {
            println!(
                "✓ Created: {} ({})",
                created.account.display_name(),
                created.account.username
            );
            println!(
                "  Role: {} | Points: {}",
                created.account.role.display_name(),
                created.account.points
            );
            if let Some(password) = created.generated_password {
                println!("  Generated password: {password}");
                println!("  Share it now; it is not stored in readable form.");
            }
        }
        Err(AccountError::AlreadyExists) => {
            println!("An account named '{username}' already exists.");
        }
        Err(AccountError::Validation(msg)) => println!("{msg}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

pub async fn cmd_user_points(
    config: &Config,
    username: &str,
    op_str: &str,
    amount: i64,
) -> anyhow::Result<()> {
    let Some(op) = parse_op(op_str) else {
        println!("Unknown operation: {op_str}");
        println!("Valid operations: add, remove, set");
        return Ok(());
    };

    let (store, actor) = super::open_store(config).await?;
    let service = SeaOrmAccountService::new(store, config.auth.clone());

    match service.adjust_points(&actor, username, op, amount).await {
        Ok(account) => {
            println!(
                "✓ {} now has {} points",
                account.display_name(),
                account.points
            );
        }
        Err(AccountError::NotFound) => println!("Account '{username}' not found."),
        Err(AccountError::Validation(msg)) => println!("{msg}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

pub async fn cmd_user_remove(config: &Config, username: &str, yes: bool) -> anyhow::Result<()> {
    let (store, actor) = super::open_store(config).await?;

    let Some(account) = store.get_account(username).await? else {
        println!("Account '{username}' not found.");
        return Ok(());
    };

    if !yes {
        println!(
            "Delete '{}' ({})? Their orders stay on record.",
            account.display_name(),
            account.username
        );
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let service = SeaOrmAccountService::new(store, config.auth.clone());

    match service.delete_account(&actor, username).await {
        Ok(()) => println!("✓ Deleted: {username}"),
        Err(AccountError::Forbidden) => {
            println!("The bootstrap administrator cannot be deleted.");
        }
        Err(AccountError::Validation(msg)) => println!("{msg}"),
        Err(AccountError::NotFound) => println!("Account '{username}' not found."),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
