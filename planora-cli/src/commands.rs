//! Subcommand implementations.

use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use planora_client::api::projects::ProjectHit;
use planora_client::api::users::UserHit;
use planora_client::search::SearchCoordinator;
use planora_client::{PlanoraClient, Result};

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List projects page by page.
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// One-shot search by name.
    Search { term: String },
    /// Interactive search: type to refine, results follow as you pause.
    Live,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users page by page.
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// One-shot search by name or email.
    Search { term: String },
    /// Interactive search: type to refine, results follow as you pause.
    Live,
}

pub async fn login(client: &PlanoraClient, email: &str, password: &str) -> Result<()> {
    let user = client.auth().login(email, password).await?;
    println!("Logged in as {} ({:?})", user.display_name, user.role);
    Ok(())
}

pub async fn logout(client: &PlanoraClient) -> Result<()> {
    client.auth().logout().await?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(client: &PlanoraClient) -> Result<()> {
    match client.auth().current_user() {
        Some(user) => println!("{} <{}> ({:?})", user.display_name, user.email, user.role),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub async fn projects(client: &PlanoraClient, command: &ProjectsCommand) -> Result<()> {
    match command {
        ProjectsCommand::List { page, size } => {
            let result = client.projects().list(*page, *size).await?;
            for project in &result.items {
                println!(
                    "{}  {:<30}  {:?}",
                    project.id, project.name, project.status
                );
            }
            print_page_footer(result.items.len(), result.total, result.page, result.has_next());
        }
        ProjectsCommand::Search { term } => {
            for hit in client.projects().search(term).await? {
                println!("{}  {}", hit.id, hit.name);
            }
        }
        ProjectsCommand::Live => {
            live_search(client.project_search(), |hit: &ProjectHit| {
                format!("{}  {}", hit.id, hit.name)
            })
            .await?;
        }
    }
    Ok(())
}

pub async fn users(client: &PlanoraClient, command: &UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List { page, size } => {
            let result = client.users().list(*page, *size).await?;
            for user in &result.items {
                println!(
                    "{}  {:<30}  {}  {:?}",
                    user.id, user.display_name, user.email, user.role
                );
            }
            print_page_footer(result.items.len(), result.total, result.page, result.has_next());
        }
        UsersCommand::Search { term } => {
            for hit in client.users().search(term).await? {
                println!("{}  {}  {}", hit.id, hit.display_name, hit.email);
            }
        }
        UsersCommand::Live => {
            live_search(client.user_search(), |hit: &UserHit| {
                format!("{}  {}  {}", hit.id, hit.display_name, hit.email)
            })
            .await?;
        }
    }
    Ok(())
}

pub async fn stats(client: &PlanoraClient) -> Result<()> {
    let stats = client.stats().dashboard().await?;
    println!("Projects:  {}", stats.projects_total);
    for (status, count) in &stats.projects_by_status {
        println!("  {:?}: {}", status, count);
    }
    println!("Users:     {}", stats.users_total);
    println!("Documents: {}", stats.documents_total);
    Ok(())
}

fn print_page_footer(shown: usize, total: u64, page: u32, has_next: bool) {
    println!("-- {} of {} (page {})", shown, total, page);
    if has_next {
        println!("-- more available, pass --page {}", page + 1);
    }
}

/// Feeds stdin lines into a debounced search and prints each settled result
/// set. An empty line quits.
async fn live_search<T, F>(search: SearchCoordinator<T>, render: F) -> Result<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T) -> String,
{
    println!("Type a search term (empty line to quit):");

    let mut state = search.state();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.map_err(|e| planora_client::Error::config(e.to_string()))? {
                    Some(line) if !line.trim().is_empty() => search.push(line.trim()),
                    _ => break,
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                if snapshot.loading {
                    debug!(query = %snapshot.debounced, "searching");
                    continue;
                }
                if let Some(error) = &snapshot.last_error {
                    eprintln!("search failed: {}", error);
                    continue;
                }
                if !snapshot.debounced.is_empty() {
                    println!("results for '{}':", snapshot.debounced);
                    for item in &snapshot.results {
                        println!("  {}", render(item));
                    }
                }
            }
        }
    }

    Ok(())
}
