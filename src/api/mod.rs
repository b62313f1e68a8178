use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub mod http;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure taxonomy for remote calls: transport (the request never got a
/// response), HTTP-level (non-2xx), payload shape, and client-side
/// validation. None are fatal; callers reset affected state and move on.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for PostStatus {
    fn default() -> Self {
        PostStatus::Pending
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub school: String,
    #[serde(default)]
    pub attainment: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// A candidate's moderation submission record. The dashboard never owns
/// one of these: the server is authoritative and the local copy is a
/// transient cache replaced wholesale on every fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub images: Vec<PostImage>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub party_list: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub party_list_managed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyList {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub acronym: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub member_count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
}

/// The remote HTTP contract consumed by the dashboard, one method per
/// endpoint. `HttpApi` is the production implementation; `InMemoryApi`
/// stands in for the backend in tests and the demo binary.
pub trait AdminApi {
    fn login(&self, email: &str, password: &str) -> ApiResult<AdminUser>;
    fn fetch_posts(&self) -> ApiResult<Vec<Post>>;
    fn approve_post(&self, post_id: i64) -> ApiResult<()>;
    fn reject_post(&self, post_id: i64, admin_notes: &str) -> ApiResult<()>;
    fn search_party_lists(&self, query: &str) -> ApiResult<Vec<PartyList>>;
    fn add_party_list_member(&self, list_id: i64, post_id: i64) -> ApiResult<()>;
    fn create_party_list(&self, name: &str, post_id: i64, platform: &[String]) -> ApiResult<()>;
}

#[derive(Default)]
struct InMemoryState {
    accounts: HashMap<String, (String, i64)>,
    posts: BTreeMap<i64, Post>,
    party_lists: BTreeMap<i64, PartyList>,
    next_list_id: i64,
    fetch_calls: usize,
    approve_calls: HashMap<i64, usize>,
    reject_calls: HashMap<i64, usize>,
    search_calls: usize,
    fail_fetch: bool,
    malformed_fetch: bool,
    fail_mutations: bool,
}

/// In-memory stand-in for the VoteHubPH backend, seeded with sample data.
/// Tracks call counts and carries failure toggles so tests can observe
/// suppression, idempotence and failure-path behavior.
#[derive(Clone)]
pub struct InMemoryApi {
    state: Arc<Mutex<InMemoryState>>,
}

pub fn sample_post(id: i64, name: &str, status: PostStatus) -> Post {
    Post {
        id,
        user_id: id + 100,
        name: name.into(),
        level: "national".into(),
        position: "Party List Representative".into(),
        bio: format!("{name} has served three terms in local office."),
        platform: "Education reform\nPublic transport\nHealthcare access".into(),
        education: vec![Education {
            school: "University of the Philippines".into(),
            attainment: "BA Political Science".into(),
        }],
        achievements: vec!["Outstanding LGU Award 2019".into()],
        images: vec![PostImage {
            url: format!("https://cdn.votehub.ph/posts/{id}/1.jpg"),
            caption: Some("Campaign launch".into()),
        }],
        profile_photo: Some(format!("https://cdn.votehub.ph/posts/{id}/profile.jpg")),
        party_list: Some("Bayan Muna".into()),
        status,
        admin_notes: None,
        party_list_managed: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

impl InMemoryApi {
    pub fn new_with_sample() -> Self {
        let mut state = InMemoryState::default();
        state
            .accounts
            .insert("admin@votehub.ph".into(), ("admin123".into(), 1));
        state
            .posts
            .insert(1, sample_post(1, "Maria Santos", PostStatus::Pending));
        state
            .posts
            .insert(2, sample_post(2, "Jose Ramirez", PostStatus::Pending));
        state
            .posts
            .insert(3, sample_post(3, "Ana Dela Cruz", PostStatus::Approved));
        state.party_lists.insert(
            1,
            PartyList {
                id: 1,
                name: "Bayan Muna".into(),
                acronym: Some("BM".into()),
                sector: Some("Labor".into()),
                member_count: 4,
            },
        );
        state.party_lists.insert(
            2,
            PartyList {
                id: 2,
                name: "Kabataan".into(),
                acronym: None,
                sector: Some("Youth".into()),
                member_count: 2,
            },
        );
        state.next_list_id = 3;
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn empty() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                next_list_id: 1,
                ..InMemoryState::default()
            })),
        }
    }

    pub fn insert_post(&self, post: Post) {
        let mut state = self.state.lock().unwrap();
        state.posts.insert(post.id, post);
    }

    pub fn post(&self, post_id: i64) -> Option<Post> {
        let state = self.state.lock().unwrap();
        state.posts.get(&post_id).cloned()
    }

    pub fn party_list_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.party_lists.len()
    }

    pub fn fetch_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.fetch_calls
    }

    pub fn approve_count(&self, post_id: i64) -> usize {
        let state = self.state.lock().unwrap();
        state.approve_calls.get(&post_id).copied().unwrap_or(0)
    }

    pub fn reject_count(&self, post_id: i64) -> usize {
        let state = self.state.lock().unwrap();
        state.reject_calls.get(&post_id).copied().unwrap_or(0)
    }

    pub fn search_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.search_calls
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        let mut state = self.state.lock().unwrap();
        state.fail_fetch = fail;
    }

    pub fn set_malformed_fetch(&self, malformed: bool) {
        let mut state = self.state.lock().unwrap();
        state.malformed_fetch = malformed;
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        let mut state = self.state.lock().unwrap();
        state.fail_mutations = fail;
    }
}

impl Default for InMemoryApi {
    fn default() -> Self {
        Self::new_with_sample()
    }
}

impl AdminApi for InMemoryApi {
    fn login(&self, email: &str, password: &str) -> ApiResult<AdminUser> {
        let state = self.state.lock().unwrap();
        match state.accounts.get(email) {
            Some((stored, id)) if stored == password => Ok(AdminUser { id: *id }),
            _ => Err(ApiError::Http {
                status: 401,
                message: "invalid email or password".into(),
            }),
        }
    }

    fn fetch_posts(&self) -> ApiResult<Vec<Post>> {
        let mut state = self.state.lock().unwrap();
        state.fetch_calls += 1;
        if state.fail_fetch {
            return Err(ApiError::Http {
                status: 500,
                message: "internal server error".into(),
            });
        }
        if state.malformed_fetch {
            return Err(ApiError::Malformed("posts payload is not an array".into()));
        }
        Ok(state.posts.values().cloned().collect())
    }

    fn approve_post(&self, post_id: i64) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        *state.approve_calls.entry(post_id).or_insert(0) += 1;
        if state.fail_mutations {
            return Err(ApiError::Http {
                status: 500,
                message: "internal server error".into(),
            });
        }
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| ApiError::Http {
                status: 404,
                message: "post not found".into(),
            })?;
        post.status = PostStatus::Approved;
        post.updated_at = Utc::now();
        Ok(())
    }

    fn reject_post(&self, post_id: i64, admin_notes: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        *state.reject_calls.entry(post_id).or_insert(0) += 1;
        if state.fail_mutations {
            return Err(ApiError::Http {
                status: 500,
                message: "internal server error".into(),
            });
        }
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| ApiError::Http {
                status: 404,
                message: "post not found".into(),
            })?;
        post.status = PostStatus::Rejected;
        post.admin_notes = Some(admin_notes.to_string());
        post.updated_at = Utc::now();
        Ok(())
    }

    fn search_party_lists(&self, query: &str) -> ApiResult<Vec<PartyList>> {
        let mut state = self.state.lock().unwrap();
        state.search_calls += 1;
        let needle = query.to_lowercase();
        Ok(state
            .party_lists
            .values()
            .filter(|list| list.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn add_party_list_member(&self, list_id: i64, post_id: i64) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mutations {
            return Err(ApiError::Http {
                status: 500,
                message: "could not add member".into(),
            });
        }
        if !state.posts.contains_key(&post_id) {
            return Err(ApiError::Http {
                status: 404,
                message: "post not found".into(),
            });
        }
        let list = state
            .party_lists
            .get_mut(&list_id)
            .ok_or_else(|| ApiError::Http {
                status: 404,
                message: "party list not found".into(),
            })?;
        list.member_count += 1;
        if let Some(post) = state.posts.get_mut(&post_id) {
            post.party_list_managed = true;
            post.updated_at = Utc::now();
        }
        Ok(())
    }

    fn create_party_list(&self, name: &str, post_id: i64, _platform: &[String]) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mutations {
            return Err(ApiError::Http {
                status: 500,
                message: "could not create party list".into(),
            });
        }
        if name.trim().is_empty() {
            return Err(ApiError::Http {
                status: 422,
                message: "party list name is required".into(),
            });
        }
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| ApiError::Http {
                status: 404,
                message: "post not found".into(),
            })?;
        post.party_list_managed = true;
        post.updated_at = Utc::now();
        let id = state.next_list_id;
        state.next_list_id += 1;
        state.party_lists.insert(
            id,
            PartyList {
                id,
                name: name.trim().to_string(),
                acronym: None,
                sector: None,
                member_count: 1,
            },
        );
        Ok(())
    }
}
