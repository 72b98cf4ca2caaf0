//! Next-color prediction.
//!
//! The command layer only sees the [`Predictor`] trait; [`ModelPredictor`]
//! is the implementation backed by a chat-completion API.

mod client;
pub mod prompt;

pub use client::ModelPredictor;

use crate::error::PredictionError;
use crate::ledger::RoundEntry;
use async_trait::async_trait;

/// Turns the recent window into a single predicted color label.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Human readable name of the backing service, shown in replies.
    fn name(&self) -> &str;

    /// Predict the next color from `recent`, oldest round first.
    async fn predict(&self, recent: &[RoundEntry]) -> Result<String, PredictionError>;
}
