//! Request payloads and their validation rules. Failures come back as a
//! field-keyed map so clients can surface per-field messages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Run a payload's rules, collapsing failures into one message per field.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    let Err(errors) = payload.validate() else {
        return Ok(());
    };

    let mut failures = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is invalid"));
            failures.insert(field.to_string(), message);
        }
    }

    Err(AppError::Validation(failures))
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 60, message = "Username must be 1-60 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password cannot be less than 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 36, message = "Invite code must be 1-36 characters"))]
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct FillRequest {
    pub book_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, message = "VolumeID is required"))]
    pub volume_id: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Subtitle is required"))]
    pub subtitle: String,
    #[validate(length(min = 1, message = "Publisher is required"))]
    pub publisher: String,
    #[validate(length(min = 1, max = 50, message = "PublishedDate must be 1-50 characters"))]
    pub published_date: String,
    #[validate(length(min = 1, max = 10, message = "PageCount must be 1-10 characters"))]
    pub page_count: String,
    #[validate(length(min = 1, message = "MaturityRating is required"))]
    pub maturity_rating: String,
    #[validate(length(min = 1, message = "Authors is required"))]
    pub authors: String,
    #[validate(length(min = 1, message = "Categories is required"))]
    pub categories: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 50, message = "Uploader must be 1-50 characters"))]
    pub uploader: String,
    #[validate(length(min = 1, max = 10, message = "Price must be 1-10 characters"))]
    pub price: String,
    #[validate(length(min = 1, max = 10, message = "ISBN10 must be 1-10 characters"))]
    pub isbn10: String,
    #[validate(length(min = 1, max = 13, message = "ISBN13 must be 1-13 characters"))]
    pub isbn13: String,
    #[validate(length(min = 1, message = "ImageLink is required"))]
    pub image_link: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewReview {
    #[validate(length(min = 1, message = "BookID is required"))]
    pub book_id: String,
    #[validate(length(min = 1, max = 1, message = "Rating must be a single character"))]
    pub rating: String,
    #[validate(length(min = 1, message = "Review is required"))]
    pub review: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewMessage {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAnnouncement {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CollectBook {
    #[serde(default)]
    pub year: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_book() -> NewBook {
        NewBook {
            volume_id: "vol-42".into(),
            title: "Dune".into(),
            subtitle: "Deluxe Edition".into(),
            publisher: "Ace".into(),
            published_date: "2019-10-01".into(),
            page_count: "704".into(),
            maturity_rating: "NOT_MATURE".into(),
            authors: "Frank Herbert".into(),
            categories: "Fiction".into(),
            description: "Spice and sand.".into(),
            uploader: "alice".into(),
            price: "9.99 USD".into(),
            isbn10: "0441013597".into(),
            isbn13: "9780441013593".into(),
            image_link: "http://example.com/dune.jpg".into(),
        }
    }

    #[test]
    fn valid_book_passes() {
        assert!(validate_payload(&valid_book()).is_ok());
    }

    #[test]
    fn empty_title_fails_with_field_message() {
        let mut book = valid_book();
        book.title = String::new();

        let Err(AppError::Validation(failures)) = validate_payload(&book) else {
            panic!("expected validation failure");
        };
        assert!(failures.contains_key("title"));
    }

    #[test]
    fn isbn13_over_limit_fails() {
        let mut book = valid_book();
        book.isbn13 = "97804410135931234".into();

        assert!(validate_payload(&book).is_err());
    }

    #[test]
    fn signup_rejects_short_password() {
        let signup = NewUser {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "short".into(),
            code: "ABC123".into(),
        };

        let Err(AppError::Validation(failures)) = validate_payload(&signup) else {
            panic!("expected validation failure");
        };
        assert!(failures.contains_key("password"));
    }

    #[test]
    fn review_rating_must_be_single_character() {
        let review = NewReview {
            book_id: "vol-42".into(),
            rating: "10".into(),
            review: "Great".into(),
        };

        assert!(validate_payload(&review).is_err());
    }
}
