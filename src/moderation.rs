use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::AdminApi;
use crate::dashboard::{fetch_posts, DashboardState};

/// Approves a post: optimistic status flip first, then the network call,
/// then an unconditional silent refetch so the speculative value is
/// reconciled against server truth on success and failure alike. A call
/// for a post already in flight is silently ignored, guaranteeing at most
/// one concurrent moderation call per post. Returns whether the call was
/// actually issued.
pub fn approve<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    post_id: i64,
    now: DateTime<Utc>,
) -> bool {
    if !state.begin_approve(post_id) {
        debug!(post_id, "approve ignored, already in flight");
        return false;
    }
    match api.approve_post(post_id) {
        Ok(()) => info!(post_id, "post approved"),
        Err(err) => warn!(post_id, error = %err, "approve failed, reconciling"),
    }
    state.finish_moderation(post_id);
    reconcile(api, state, now);
    true
}

/// Rejects a post with the admin's note draft (or the placeholder when
/// blank). The draft is cleared at initiation, independent of outcome.
/// Same in-flight guard and reconcile-by-refetch contract as `approve`;
/// there is no in-place rollback path.
pub fn reject<A: AdminApi>(
    api: &A,
    state: &mut DashboardState,
    post_id: i64,
    now: DateTime<Utc>,
) -> bool {
    let Some(notes) = state.begin_reject(post_id) else {
        debug!(post_id, "reject ignored, already in flight");
        return false;
    };
    match api.reject_post(post_id, &notes) {
        Ok(()) => info!(post_id, "post rejected"),
        Err(err) => warn!(post_id, error = %err, "reject failed, reconciling"),
    }
    state.finish_moderation(post_id);
    reconcile(api, state, now);
    true
}

// The reconciling fetch replaces the entire cache, so when several posts'
// reconciles race, the last response to land wins. Accepted: the server
// is the source of truth and every fetch returns the complete queue.
fn reconcile<A: AdminApi>(api: &A, state: &mut DashboardState, now: DateTime<Utc>) {
    fetch_posts(api, state, true, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{sample_post, InMemoryApi, PostStatus};
    use crate::dashboard::{StatusFilter, DEFAULT_REJECT_NOTES};

    fn loaded_state(api: &InMemoryApi) -> DashboardState {
        let mut state = DashboardState::new();
        fetch_posts(api, &mut state, false, Utc::now());
        state
    }

    #[test]
    fn approve_flips_status_and_reconciles() {
        let api = InMemoryApi::new_with_sample();
        let mut state = loaded_state(&api);
        assert_eq!(state.post(1).unwrap().status, PostStatus::Pending);

        assert!(approve(&api, &mut state, 1, Utc::now()));
        assert_eq!(state.post(1).unwrap().status, PostStatus::Approved);
        assert_eq!(api.approve_count(1), 1);
        // initial load plus the reconcile
        assert_eq!(api.fetch_count(), 2);
    }

    #[test]
    fn second_approve_while_in_flight_is_a_noop() {
        let api = InMemoryApi::new_with_sample();
        let mut state = loaded_state(&api);

        // simulate the first call still being in flight
        assert!(state.begin_approve(1));
        assert!(!approve(&api, &mut state, 1, Utc::now()));
        assert_eq!(api.approve_count(1), 0);
    }

    #[test]
    fn optimistic_value_is_visible_before_resolution() {
        let api = InMemoryApi::new_with_sample();
        let mut state = loaded_state(&api);
        state.set_note_draft(1, "bad data");

        let notes = state.begin_reject(1).unwrap();
        assert_eq!(notes, "bad data");
        let post = state.post(1).unwrap();
        assert_eq!(post.status, PostStatus::Rejected);
        assert_eq!(post.admin_notes.as_deref(), Some("bad data"));
        assert!(state.moderation_in_flight(1));
    }

    #[test]
    fn reject_reconciles_to_server_truth() {
        let api = InMemoryApi::new_with_sample();
        let mut state = loaded_state(&api);
        state.set_note_draft(1, "bad data");

        assert!(reject(&api, &mut state, 1, Utc::now()));
        let server = api.post(1).unwrap();
        assert_eq!(state.post(1), Some(&server));
        assert_eq!(server.admin_notes.as_deref(), Some("bad data"));
        assert!(!state.moderation_in_flight(1));
    }

    #[test]
    fn blank_draft_sends_placeholder_notes() {
        let api = InMemoryApi::new_with_sample();
        let mut state = loaded_state(&api);

        assert!(reject(&api, &mut state, 2, Utc::now()));
        assert_eq!(
            api.post(2).unwrap().admin_notes.as_deref(),
            Some(DEFAULT_REJECT_NOTES)
        );
    }

    #[test]
    fn failed_mutation_is_reverted_by_the_refetch() {
        let api = InMemoryApi::new_with_sample();
        let mut state = loaded_state(&api);
        api.set_fail_mutations(true);

        assert!(approve(&api, &mut state, 1, Utc::now()));
        // the reconcile fetched the unchanged server state
        assert_eq!(state.post(1).unwrap().status, PostStatus::Pending);
        assert!(!state.moderation_in_flight(1));
    }

    #[test]
    fn approved_post_leaves_pending_filter_view() {
        let api = InMemoryApi::empty();
        api.insert_post(sample_post(1, "Solo", PostStatus::Pending));
        let mut state = loaded_state(&api);
        state.filter = StatusFilter::Pending;
        assert_eq!(state.filtered().len(), 1);

        assert!(approve(&api, &mut state, 1, Utc::now()));
        assert_eq!(state.post(1).unwrap().status, PostStatus::Approved);
        assert!(state.filtered().is_empty());
    }
}
