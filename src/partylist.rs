use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::{AdminApi, ApiError, ApiResult, PartyList};
use crate::dashboard::{fetch_posts, DashboardState};

/// Queries shorter than this issue no search request and clear any prior
/// results.
pub const MIN_SEARCH_LEN: usize = 2;

/// Per-post modal state for the party-list workflow. Panels are keyed by
/// post id so each post's search and in-flight state stays independent,
/// even though the triggering UI only shows one at a time.
#[derive(Clone, Debug, Default)]
pub struct PartyListPanel {
    pub open: bool,
    pub query: String,
    pub results: Vec<PartyList>,
    pub searching: bool,
    pub selected: Option<i64>,
    pub busy: bool,
}

pub fn open_panel(state: &mut DashboardState, post_id: i64) {
    state.panel_mut(post_id).open = true;
}

/// Closing discards the whole per-post panel state.
pub fn close_panel(state: &mut DashboardState, post_id: i64) {
    state.panels.remove(&post_id);
}

pub fn select_result(state: &mut DashboardState, post_id: i64, list_id: i64) {
    state.panel_mut(post_id).selected = Some(list_id);
}

/// Updates the search query for a post's panel. The search is length
/// gated rather than debounced: short queries clear prior results without
/// touching the network, anything at or past the threshold fires one
/// search whose response replaces the results wholesale.
pub fn set_query<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    post_id: i64,
    query: &str,
) -> ApiResult<()> {
    let panel = state.panel_mut(post_id);
    panel.query = query.to_string();
    if query.chars().count() < MIN_SEARCH_LEN {
        panel.results.clear();
        return Ok(());
    }
    panel.searching = true;
    let outcome = api.search_party_lists(query);
    panel.searching = false;
    match outcome {
        Ok(results) => {
            debug!(post_id, query, hits = results.len(), "party list search");
            panel.results = results;
            Ok(())
        }
        Err(err) => {
            warn!(post_id, error = %err, "party list search failed");
            panel.results.clear();
            Err(err)
        }
    }
}

/// Attaches the post to the selected existing party list. Requires a
/// selection; guards against double submission per post; on success the
/// panel is discarded, the post is marked managed locally and the queue
/// is refetched. Failures carry the server-provided message back to the
/// caller for display.
pub fn attach_existing<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    post_id: i64,
    now: DateTime<Utc>,
) -> ApiResult<()> {
    let panel = state.panel_mut(post_id);
    if panel.busy {
        return Ok(());
    }
    let Some(list_id) = panel.selected else {
        return Err(ApiError::Validation("select a party list first".into()));
    };
    panel.busy = true;
    let outcome = api.add_party_list_member(list_id, post_id);
    finish_action(api, state, post_id, outcome, now)
}

/// Creates a new party list from the post's free-text party name and its
/// platform text normalized to a list. Same guard and success/failure
/// handling as `attach_existing`.
pub fn create_new<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    post_id: i64,
    now: DateTime<Utc>,
) -> ApiResult<()> {
    if state.panel_mut(post_id).busy {
        return Ok(());
    }
    let Some(post) = state.post(post_id) else {
        return Err(ApiError::Validation("post is not in the queue".into()));
    };
    let Some(name) = post.party_list.clone().filter(|n| !n.trim().is_empty()) else {
        return Err(ApiError::Validation("post has no party list name".into()));
    };
    let platform = normalize_platform(&post.platform);
    state.panel_mut(post_id).busy = true;
    let outcome = api.create_party_list(&name, post_id, &platform);
    finish_action(api, state, post_id, outcome, now)
}

fn finish_action<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    post_id: i64,
    outcome: ApiResult<()>,
    now: DateTime<Utc>,
) -> ApiResult<()> {
    match outcome {
        Ok(()) => {
            state.panels.remove(&post_id);
            if let Some(post) = state.post_mut(post_id) {
                post.party_list_managed = true;
            }
            info!(post_id, "party list managed");
            fetch_posts(api, state, true, now);
            Ok(())
        }
        Err(err) => {
            state.panel_mut(post_id).busy = false;
            Err(err)
        }
    }
}

/// Splits free-form platform text into its non-empty trimmed lines.
pub fn normalize_platform(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
