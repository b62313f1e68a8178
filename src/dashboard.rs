use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::api::{AdminApi, ApiResult, Post, PostStatus};
use crate::partylist::PartyListPanel;

pub const DEFAULT_REJECT_NOTES: &str = "Rejected by admin";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusFilter {
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn matches(self, status: PostStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == PostStatus::Pending,
            StatusFilter::Approved => status == PostStatus::Approved,
            StatusFilter::Rejected => status == PostStatus::Rejected,
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Pending
    }
}

/// The dashboard's client-side state. `posts` is a lossy, eventually
/// consistent mirror of the server's moderation queue: every fetch
/// replaces it wholesale, and every local mutation is speculative until
/// the next fetch confirms or overwrites it.
#[derive(Default)]
pub struct DashboardState {
    pub posts: Vec<Post>,
    pub filter: StatusFilter,
    /// Primary indicator, driven by first load and manual refresh.
    pub loading: bool,
    /// Secondary indicator, driven by silent background refreshes.
    pub refreshing: bool,
    pub loaded_once: bool,
    pub last_fetched: Option<DateTime<Utc>>,
    note_drafts: HashMap<i64, String>,
    in_flight: HashSet<i64>,
    pub panels: HashMap<i64, PartyListPanel>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, post_id: i64) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == post_id)
    }

    pub(crate) fn post_mut(&mut self, post_id: i64) -> Option<&mut Post> {
        self.posts.iter_mut().find(|post| post.id == post_id)
    }

    /// The subset of the cache matching the active filter.
    pub fn filtered(&self) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|post| self.filter.matches(post.status))
            .collect()
    }

    pub fn begin_fetch(&mut self, silent: bool) {
        if silent {
            self.refreshing = true;
        } else {
            self.loading = true;
        }
    }

    /// Applies a fetch outcome. Success replaces the whole collection and
    /// records the fetch time; any failure (including a malformed
    /// payload) empties the cache. No retry is scheduled here — the next
    /// poll or user action is the only retry path.
    pub fn apply_fetch(&mut self, outcome: ApiResult<Vec<Post>>, silent: bool, now: DateTime<Utc>) {
        match outcome {
            Ok(posts) => {
                self.posts = posts;
                self.last_fetched = Some(now);
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch moderation queue");
                self.posts.clear();
            }
        }
        self.loaded_once = true;
        if silent {
            self.refreshing = false;
        } else {
            self.loading = false;
        }
    }

    pub fn set_note_draft(&mut self, post_id: i64, notes: impl Into<String>) {
        self.note_drafts.insert(post_id, notes.into());
    }

    pub fn note_draft(&self, post_id: i64) -> Option<&str> {
        self.note_drafts.get(&post_id).map(String::as_str)
    }

    pub fn moderation_in_flight(&self, post_id: i64) -> bool {
        self.in_flight.contains(&post_id)
    }

    /// Registers an approve call and applies the optimistic status flip.
    /// Returns false when a moderation call for this post is already in
    /// flight, in which case nothing changes.
    pub fn begin_approve(&mut self, post_id: i64) -> bool {
        if !self.in_flight.insert(post_id) {
            return false;
        }
        if let Some(post) = self.post_mut(post_id) {
            post.status = PostStatus::Approved;
        }
        true
    }

    /// Registers a reject call: takes the note draft (falling back to the
    /// fixed placeholder), clears the draft regardless of outcome, and
    /// applies the optimistic status/notes mutation. Returns the notes to
    /// send, or None when the post is already in flight.
    pub fn begin_reject(&mut self, post_id: i64) -> Option<String> {
        if !self.in_flight.insert(post_id) {
            return None;
        }
        let notes = match self.note_drafts.remove(&post_id) {
            Some(draft) if !draft.trim().is_empty() => draft,
            _ => DEFAULT_REJECT_NOTES.to_string(),
        };
        if let Some(post) = self.post_mut(post_id) {
            post.status = PostStatus::Rejected;
            post.admin_notes = Some(notes.clone());
        }
        Some(notes)
    }

    pub fn finish_moderation(&mut self, post_id: i64) {
        self.in_flight.remove(&post_id);
    }

    pub(crate) fn panel_mut(&mut self, post_id: i64) -> &mut PartyListPanel {
        self.panels.entry(post_id).or_default()
    }

    pub fn panel(&self, post_id: i64) -> Option<&PartyListPanel> {
        self.panels.get(&post_id)
    }
}

/// Issues one GET for the moderation queue and reconciles the cache with
/// whatever comes back. A silent fetch drives the secondary `refreshing`
/// indicator; a non-silent one drives `loading` (first load and manual
/// refresh, which also bypasses the poller's cool-down by construction).
pub fn fetch_posts<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    silent: bool,
    now: DateTime<Utc>,
) {
    state.begin_fetch(silent);
    let outcome = api.fetch_posts();
    state.apply_fetch(outcome, silent, now);
}

/// Changes the active status filter. Refetches silently, but only after
/// the initial fetch has completed and only when the cache is non-empty,
/// so first render does not fetch twice.
pub fn set_filter<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    filter: StatusFilter,
    now: DateTime<Utc>,
) {
    state.filter = filter;
    if state.loaded_once && !state.posts.is_empty() {
        debug!(?filter, "filter changed, refreshing queue");
        fetch_posts(api, state, true, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{sample_post, InMemoryApi};

    #[test]
    fn fetch_replaces_collection_and_records_time() {
        let api = InMemoryApi::new_with_sample();
        let mut state = DashboardState::new();
        let now = Utc::now();

        fetch_posts(&api, &mut state, false, now);
        assert_eq!(state.posts.len(), 3);
        assert_eq!(state.last_fetched, Some(now));
        assert!(state.loaded_once);
        assert!(!state.loading);
    }

    #[test]
    fn failed_fetch_empties_cache() {
        let api = InMemoryApi::new_with_sample();
        let mut state = DashboardState::new();
        fetch_posts(&api, &mut state, false, Utc::now());
        assert!(!state.posts.is_empty());

        api.set_fail_fetch(true);
        let later = Utc::now();
        fetch_posts(&api, &mut state, true, later);
        assert!(state.posts.is_empty());
        // last successful fetch time is untouched by the failure
        assert_ne!(state.last_fetched, Some(later));
    }

    #[test]
    fn malformed_payload_is_a_failure_not_a_noop() {
        let api = InMemoryApi::new_with_sample();
        let mut state = DashboardState::new();
        fetch_posts(&api, &mut state, false, Utc::now());

        api.set_malformed_fetch(true);
        fetch_posts(&api, &mut state, true, Utc::now());
        assert!(state.posts.is_empty());
    }

    #[test]
    fn silent_fetch_drives_secondary_indicator() {
        let mut state = DashboardState::new();
        state.begin_fetch(true);
        assert!(state.refreshing);
        assert!(!state.loading);
        state.apply_fetch(Ok(Vec::new()), true, Utc::now());
        assert!(!state.refreshing);

        state.begin_fetch(false);
        assert!(state.loading);
        assert!(!state.refreshing);
    }

    #[test]
    fn filtered_returns_exact_subset() {
        let mut state = DashboardState::new();
        state.posts = vec![
            sample_post(1, "A", PostStatus::Pending),
            sample_post(2, "B", PostStatus::Approved),
            sample_post(3, "C", PostStatus::Rejected),
            sample_post(4, "D", PostStatus::Pending),
        ];

        state.filter = StatusFilter::Pending;
        let ids: Vec<i64> = state.filtered().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 4]);

        state.filter = StatusFilter::Approved;
        assert_eq!(state.filtered().len(), 1);

        state.filter = StatusFilter::Rejected;
        assert_eq!(state.filtered().len(), 1);

        state.filter = StatusFilter::All;
        assert_eq!(state.filtered().len(), 4);
    }

    #[test]
    fn filter_change_refetches_only_after_first_load() {
        let api = InMemoryApi::new_with_sample();
        let mut state = DashboardState::new();

        // before the initial fetch completes: no request
        set_filter(&api, &mut state, StatusFilter::All, Utc::now());
        assert_eq!(api.fetch_count(), 0);

        fetch_posts(&api, &mut state, false, Utc::now());
        assert_eq!(api.fetch_count(), 1);

        set_filter(&api, &mut state, StatusFilter::Approved, Utc::now());
        assert_eq!(api.fetch_count(), 2);
    }

    #[test]
    fn filter_change_with_empty_cache_does_not_refetch() {
        let api = InMemoryApi::empty();
        let mut state = DashboardState::new();
        fetch_posts(&api, &mut state, false, Utc::now());
        assert_eq!(api.fetch_count(), 1);

        set_filter(&api, &mut state, StatusFilter::All, Utc::now());
        assert_eq!(api.fetch_count(), 1);
    }

    #[test]
    fn blank_note_draft_falls_back_to_placeholder() {
        let mut state = DashboardState::new();
        state.posts = vec![sample_post(1, "A", PostStatus::Pending)];
        state.set_note_draft(1, "   ");

        let notes = state.begin_reject(1).unwrap();
        assert_eq!(notes, DEFAULT_REJECT_NOTES);
        assert!(state.note_draft(1).is_none());
    }
}
