use tracing::info;

use crate::api::{AdminApi, AdminUser, ApiError, ApiResult};
use crate::session::{persist_session, SessionStore};

/// Login form state. `busy` disables the submit control while a request
/// is in flight; `error` is the inline user-visible failure text.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub busy: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            busy: false,
            error: None,
        }
    }

    /// Validates the form and marks it busy. Returns false when the form
    /// is already submitting or a field is missing; in the latter case
    /// the inline error is set and no request should be made.
    pub fn begin_submit(&mut self) -> bool {
        if self.busy {
            return false;
        }
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some("Email and password are required".into());
            return false;
        }
        self.error = None;
        self.busy = true;
        true
    }

    /// Records the outcome of the authentication request. Entered
    /// credentials are left as typed on failure so the user can retry.
    pub fn finish_submit(&mut self, outcome: &ApiResult<AdminUser>) {
        self.busy = false;
        if let Err(err) = outcome {
            self.error = Some(match err {
                ApiError::Http { message, .. } => message.clone(),
                other => other.to_string(),
            });
        }
    }
}

/// Submits the form once: at most one in-flight authentication request,
/// session marker persisted only on success. Returns the authenticated
/// admin so the caller can navigate to the dashboard.
pub fn submit<A: AdminApi, S: SessionStore>(
    api: &A,
    store: &mut S,
    form: &mut LoginForm,
) -> Option<AdminUser> {
    if !form.begin_submit() {
        return None;
    }
    let outcome = api.login(form.email.trim(), &form.password);
    form.finish_submit(&outcome);
    match outcome {
        Ok(user) => {
            persist_session(store, user.id);
            info!(admin_id = user.id, "admin logged in");
            Some(user)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryApi;
    use crate::session::{guard, MemoryStore, Route};

    #[test]
    fn successful_login_persists_marker() {
        let api = InMemoryApi::new_with_sample();
        let mut store = MemoryStore::new();
        let mut form = LoginForm::new("admin@votehub.ph", "admin123");

        let user = submit(&api, &mut store, &mut form).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(guard(&store), Route::Dashboard);
        assert!(form.error.is_none());
        assert!(!form.busy);
    }

    #[test]
    fn rejected_credentials_leave_marker_unset() {
        let api = InMemoryApi::new_with_sample();
        let mut store = MemoryStore::new();
        let mut form = LoginForm::new("admin@votehub.ph", "wrong");

        assert!(submit(&api, &mut store, &mut form).is_none());
        assert_eq!(guard(&store), Route::Login);
        assert_eq!(form.error.as_deref(), Some("invalid email or password"));
        assert_eq!(form.password, "wrong");
    }

    #[test]
    fn empty_fields_never_reach_the_network() {
        let api = InMemoryApi::new_with_sample();
        let mut store = MemoryStore::new();
        let mut form = LoginForm::new("", "admin123");

        assert!(submit(&api, &mut store, &mut form).is_none());
        assert!(form.error.is_some());
    }

    #[test]
    fn busy_form_ignores_second_submit() {
        let mut form = LoginForm::new("admin@votehub.ph", "admin123");
        assert!(form.begin_submit());
        assert!(!form.begin_submit());
    }
}
