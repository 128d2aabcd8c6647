use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::draws::models::GameType;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Structural error: {0}")]
    Structural(#[from] MatchError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Malformed ticket or result shapes, rejected at the evaluator boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Unknown game type: {0}")]
    UnknownGame(String),

    #[error("{game} result must have {expected} numbers, got {actual}")]
    WrongSetSize {
        game: GameType,
        expected: usize,
        actual: usize,
    },

    #[error("{game} result must have {expected} stars, got {actual}")]
    WrongStarCount {
        game: GameType,
        expected: usize,
        actual: usize,
    },

    #[error("Ticket is for {ticket:?} but result is for {result:?}")]
    GameMismatch { ticket: GameType, result: GameType },

    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid digit: {0:?}")]
    InvalidDigit(String),

    #[error("Hit category {code:?} is not part of the {game} vocabulary")]
    UnknownCategory { game: GameType, code: String },

    #[error("Ticket {0} has no numbers")]
    EmptyTicket(String),

    #[error("Ticket {0} has no draw references")]
    NoDrawReferences(String),

    #[error("Invalid draw identifier: {0:?}")]
    InvalidDrawId(String),

    #[error("Draw {0} has no date")]
    MissingDate(String),
}

/// External fetch failures. Never fatal to a reconciliation run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{game} draw of {date} not published yet")]
    NotPublished { game: GameType, date: NaiveDate },

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            AppError::Structural(MatchError::GameMismatch { ticket, result }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "GAME_MISMATCH",
                format!("Ticket game {} does not match result game {}", ticket, result),
                Some(serde_json::json!({
                    "ticket_game": ticket,
                    "result_game": result,
                })),
            ),
            AppError::Structural(err) => (
                StatusCode::BAD_REQUEST,
                "STRUCTURAL_ERROR",
                err.to_string(),
                None,
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                msg,
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Fetch(err) => (
                StatusCode::BAD_GATEWAY,
                "FETCH_FAILED",
                err.to_string(),
                None,
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                None,
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FetchError::Malformed(error.to_string())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

impl From<MigrateError> for AppError {
    fn from(error: MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {:?}", error))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
