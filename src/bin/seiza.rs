// Native binary for Seiza - inspect and move persisted staking screen state

use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::sync::Arc;

use seiza::{
    config::{load, Command, Config},
    loading::GraphqlClient,
    location::{Location, MemoryLocation},
    platform::SqliteStore,
    staking::{ListStatus, StakingSession, STAKING_PATH},
    sync::{Reconcile, SyncContext},
    table::{Cell, TableSnapshot},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (cfg, command) = load().context("Failed to load configuration")?;
    let store = Arc::new(SqliteStore::open(&cfg.store_path)?);

    match command {
        Command::Query => {
            let session = open_session(&cfg, store);
            println!("{}", session.list.get_screen_url_query());
        }
        Command::Open { query } => {
            let location = Arc::new(MemoryLocation::with_search(STAKING_PATH, &query));
            let ctx = SyncContext::new(store, location.clone());
            let session = StakingSession::new(ctx, cfg.clone());
            match session.mount(&location.search()) {
                Reconcile::AdoptedFromUrl => log::info!("stored state replaced from link"),
                Reconcile::RestoredFromStorage => log::info!("no screen state in link, using stored state"),
                Reconcile::RenderDirect => log::info!("stored state left as is"),
            }
            println!("{}", location.href());
        }
        Command::Adopt { query } => {
            let session = open_session(&cfg, store);
            session.list.set_screen_storage_from_query(&query);
            println!("{}", session.list.get_screen_url_query());
        }
        Command::List { page } => {
            let mut session = open_session(&cfg, store);
            let client = GraphqlClient::new(&cfg.graphql_url, cfg.request_timeout_ms)?;
            session.refresh(&client).await;
            if let Some(err) = &session.pools_state().error {
                bail!("{}: {}", err.user_message(), err.message);
            }
            let snap = session.list_snapshot(page);
            match (snap.status, snap.table) {
                (ListStatus::Empty, _) | (_, None) => println!("no data"),
                (_, Some(table)) => print_table(&table),
            }
        }
        Command::Export { out } => {
            let mut session = open_session(&cfg, store);
            // Names are nice to have; an offline export carries hashes only.
            match GraphqlClient::new(&cfg.graphql_url, cfg.request_timeout_ms) {
                Ok(client) => {
                    session.refresh(&client).await;
                    if let Some(err) = &session.pools_state().error {
                        log::warn!("exporting without pool names: {}", err.message);
                    }
                }
                Err(e) => log::warn!("exporting without pool names: {e:#}"),
            }
            let (name, json) = session.export(Utc::now())?;
            let path = out.unwrap_or_else(|| name.into());
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{}", path.display());
        }
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let mut session = open_session(&cfg, store);
            if !session.import(&text) {
                bail!("{} is not a valid pool export", file.display());
            }
            println!("{}", session.list.selected_pools.selected().join("\n"));
        }
        Command::Reset => {
            let session = open_session(&cfg, store);
            session.list.reset();
            session.user_ada.field().reset();
            log::info!("cleared stored screen state");
        }
        Command::Config => cfg.print_summary(),
    }
    Ok(())
}

/// Session mounted on the bare screen path, so it reads the stored state.
fn open_session(cfg: &Config, store: Arc<SqliteStore>) -> StakingSession {
    let location = Arc::new(MemoryLocation::new(STAKING_PATH));
    let session = StakingSession::new(SyncContext::new(store, location.clone()), cfg.clone());
    session.mount(&location.search());
    session
}

fn cell_text(cell: &Cell) -> &str {
    match cell {
        Cell::Text { text } | Cell::Badge { text, .. } | Cell::Link { text, .. } => text,
        Cell::Empty => "-",
    }
}

fn print_table(table: &TableSnapshot) {
    println!("{}", table.headers.join(" | "));
    for row in &table.rows {
        let cells: Vec<&str> = row.cells.iter().map(cell_text).collect();
        println!("{}", cells.join(" | "));
    }
    let p = &table.pagination;
    if p.page == 0 {
        println!("(no such page; {} pages)", p.page_count);
    } else {
        println!("page {}/{} of {} pools", p.page, p.page_count, table.total_count);
    }
}
