use chrono::Utc;
use dotenvy::dotenv;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use votehub_admin::api::InMemoryApi;
use votehub_admin::config::AppConfig;
use votehub_admin::dashboard::{fetch_posts, DashboardState, StatusFilter};
use votehub_admin::login::{submit, LoginForm};
use votehub_admin::moderation::approve;
use votehub_admin::partylist::{open_panel, select_result, set_query};
use votehub_admin::poller::Poller;
use votehub_admin::session::{guard, MemoryStore};

/// Walks the whole moderation workflow against the in-memory backend:
/// guard, login, first fetch, an approval, and a party-list search.
fn main() {
    dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env();
    info!(api = %config.api_base, site = %config.site_url, "starting demo");

    let api = InMemoryApi::new_with_sample();
    let mut store = MemoryStore::new();

    let mut form = LoginForm::new("admin@votehub.ph", "admin123");
    let admin = submit(&api, &mut store, &mut form).expect("demo credentials are seeded");
    info!(route = ?guard(&store), "session established");

    let mut state = DashboardState::new();
    let mut poller = Poller::start(Utc::now());
    fetch_posts(&api, &mut state, false, Utc::now());

    state.filter = StatusFilter::Pending;
    let pending_before = state.filtered().len();

    let first_pending = state.filtered().first().map(|post| post.id);
    if let Some(post_id) = first_pending {
        approve(&api, &mut state, post_id, Utc::now());
        open_panel(&mut state, post_id);
        set_query(&api, &mut state, post_id, "bayan").expect("seeded search cannot fail");
        if let Some(list_id) = state
            .panel(post_id)
            .and_then(|panel| panel.results.first())
            .map(|list| list.id)
        {
            select_result(&mut state, post_id, list_id);
        }
    }

    poller.stop();

    println!(
        "{}",
        json!({
            "admin_id": admin.id,
            "pending_before": pending_before,
            "pending_after": state.filtered().len(),
            "queue_size": state.posts.len(),
        })
    );
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
