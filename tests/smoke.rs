use serde_json::json;
use votehub_admin::api::{AdminApi, InMemoryApi, Post, PostStatus};
use votehub_admin::config::AppConfig;

#[test]
fn sample_backend_serves_the_seeded_queue() {
    let api = InMemoryApi::new_with_sample();
    let posts = api.fetch_posts().unwrap();
    assert_eq!(posts.len(), 3);
    assert!(posts.iter().any(|post| post.status == PostStatus::Pending));
}

#[test]
fn post_deserializes_from_a_minimal_server_payload() {
    let value = json!({
        "id": 9,
        "user_id": 42,
        "name": "Minimal Candidate",
        "created_at": "2024-05-01T00:00:00Z",
        "updated_at": "2024-05-01T00:00:00Z"
    });
    let post: Post = serde_json::from_value(value).unwrap();
    assert_eq!(post.status, PostStatus::Pending);
    assert!(!post.party_list_managed);
    assert!(post.education.is_empty());
}

#[test]
fn config_falls_back_to_local_development_urls() {
    // no VOTEHUB_* vars set in the test environment
    if std::env::var("VOTEHUB_API_URL").is_err() {
        let config = AppConfig::from_env();
        assert!(config.api_base.starts_with("http://127.0.0.1"));
        assert!(!config.api_base.ends_with('/'));
    }
}
