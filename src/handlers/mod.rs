//! HTTP handlers, grouped by resource. Every handler answers with the
//! `ApiResponse` envelope on success and `AppError` on failure.

use axum::Json;

use crate::{error::AppError, models::ApiResponse};

pub mod chat;
pub mod cities;
pub mod dashboard;
pub mod destinations;
pub mod route_plans;
pub mod users;

/// Result type shared by all handlers.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub(crate) fn ok<T>(message: &str, data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(message, data)))
}

/// Validator
///
/// Collects field errors so the client sees every problem at once,
/// mirroring the list returned under `data` for a 400 "Validation error".
#[derive(Default)]
pub(crate) struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{field} is required"));
        }
        self
    }

    pub fn alphanumeric(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            self.errors.push(format!("{field} must be alphanumeric"));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !looks_like_email(value) {
            self.errors.push(format!("{field} must be a valid email address"));
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.errors
                .push(format!("{field} must be at least {min} characters"));
        }
        self
    }

    pub fn check(&mut self, condition: bool, message: &str) -> &mut Self {
        if !condition {
            self.errors.push(message.to_string());
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// Trims, upper-cases and de-duplicates category names, keeping first-seen order.
pub(crate) fn normalize_categories(raw: &[String]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::with_capacity(raw.len());
    for category in raw {
        let category = category.trim().to_uppercase();
        if !category.is_empty() && !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_collects_every_failure() {
        let err = Validator::new()
            .required("username", "")
            .email("email", "not-an-email")
            .min_len("password", "abc", 6)
            .finish()
            .unwrap_err();

        match err {
            AppError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn email_needs_at_sign_and_dotted_domain() {
        assert!(looks_like_email("ana@example.com"));
        assert!(!looks_like_email("ana@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ana.example.com"));
    }

    #[test]
    fn categories_are_upper_cased_and_deduplicated() {
        let raw = vec![" nature".to_string(), "NATURE".to_string(), "culture".to_string(), " ".to_string()];
        assert_eq!(normalize_categories(&raw), vec!["NATURE", "CULTURE"]);
    }
}
