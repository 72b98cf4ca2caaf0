//! Error kinds surfaced by the ledger and the prediction client.
//!
//! Command handlers turn these into user-facing replies; none of them is
//! allowed to terminate the bot process.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("round color must not be empty")]
    EmptyColor,
    #[error("unknown round status '{0}'; expected win or lose")]
    InvalidStatus(String),
    #[error("failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("need at least {need} rounds of history to predict, have {have}")]
    InsufficientHistory { have: usize, need: usize },
    #[error("prediction service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("prediction request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("prediction service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),
}

/// Failure of a single chat command. Reported back to the channel only.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<reqwest::Error> for PredictionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PredictionError::MalformedResponse(err.to_string())
        } else {
            PredictionError::Transport(err)
        }
    }
}
