//! Dog profiles and their lineage.
//!
//! Pedigree traversal and parentage checks only need [`DogLookup`], so they
//! run unchanged against a live connection or an in-memory fixture.

pub mod lookup;
pub mod parentage;
pub mod pedigree;
pub mod repository;

use std::fmt;

use thiserror::Error;

use crate::error::AppError;
use crate::models::DogSex;

pub use lookup::{DogLookup, DogRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRole {
    Sire,
    Dam,
}

impl ParentRole {
    pub const fn required_sex(self) -> DogSex {
        match self {
            ParentRole::Sire => DogSex::Male,
            ParentRole::Dam => DogSex::Female,
        }
    }
}

impl fmt::Display for ParentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRole::Sire => f.write_str("sire"),
            ParentRole::Dam => f.write_str("dam"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DogError {
    #[error("dog not found")]
    NotFound,
    #[error("only the owner can modify this dog")]
    Forbidden,
    #[error("{role} must reference an existing {} dog", .role.required_sex())]
    InvalidParent { role: ParentRole },
    #[error("breed does not exist")]
    UnknownBreed,
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

pub type DogResult<T> = Result<T, DogError>;

impl From<DogError> for AppError {
    fn from(value: DogError) -> Self {
        match value {
            DogError::NotFound => AppError::not_found(),
            DogError::Forbidden => AppError::forbidden(value.to_string()),
            DogError::InvalidParent { .. } | DogError::UnknownBreed | DogError::Validation(_) => {
                AppError::bad_request(value.to_string())
            }
            DogError::Database(err) => AppError::from(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn invalid_parent_names_role_and_sex() {
        let err = DogError::InvalidParent {
            role: ParentRole::Dam,
        };
        assert_eq!(err.to_string(), "dam must reference an existing female dog");
    }

    #[test]
    fn maps_onto_http_statuses() {
        let cases = [
            (DogError::NotFound, StatusCode::NOT_FOUND),
            (DogError::Forbidden, StatusCode::FORBIDDEN),
            (
                DogError::InvalidParent {
                    role: ParentRole::Sire,
                },
                StatusCode::BAD_REQUEST,
            ),
            (DogError::UnknownBreed, StatusCode::BAD_REQUEST),
            (
                DogError::Validation("name must not be empty".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DogError::Database(diesel::result::Error::NotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                DogError::Database(diesel::result::Error::RollbackTransaction),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }
}
