//! Error types shared by components and collaborators.
//!
//! None of these reach the user: callers degrade or skip the enhancement.

use thiserror::Error;

use crate::ids::CueId;

/// A durable key/value record could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage is not reachable.
    #[error("storage unavailable for {key}: {reason}")]
    Unavailable {
        /// The record key.
        key: String,
        /// Underlying cause.
        reason: String,
    },

    /// The record exists but cannot be decoded.
    #[error("corrupt record {key}: {reason}")]
    Corrupt {
        /// The record key.
        key: String,
        /// Decoder message.
        reason: String,
    },
}

/// Media playback was refused or the asset is absent.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Playback policy rejected the request (autoplay without a gesture).
    #[error("playback of {cue} rejected: {reason}")]
    Rejected {
        /// The cue that was refused.
        cue: CueId,
        /// Policy message.
        reason: String,
    },

    /// No asset is registered under this cue.
    #[error("missing media asset: {0}")]
    Missing(CueId),
}

/// The surface referenced by an effect is absent from the current view.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The named target does not exist.
    #[error("missing surface target: {0}")]
    MissingTarget(&'static str),
}

/// A string did not name a known identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    /// Not of the form `fragment-<n>` with `n >= 1`.
    #[error("invalid fragment id: {0:?}")]
    Fragment(String),

    /// Not a known scene.
    #[error("unknown scene: {0:?}")]
    Scene(String),
}
