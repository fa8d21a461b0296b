//! Bet-slip import helper.
//!
//! Defines the `SlipReader` trait and provides an AI-vision
//! implementation that pre-fills a bet draft from a screenshotted slip.
//! Implementors return a partial [`BetDraft`] suggestion only — the user
//! reviews and completes it before it becomes a real bet, and the core
//! never consumes an unreviewed draft.

pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::BetDraft;

/// Abstraction over bet-slip readers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlipReader: Send + Sync {
    /// Extract a draft from a base64-encoded slip image.
    ///
    /// The caller encodes the image and passes its MIME type (e.g.
    /// `image/png`).
    async fn read_slip(&self, image_base64: &str, mime_type: &str) -> Result<BetDraft>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
