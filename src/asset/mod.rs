//! Image asset references and the per-asset upload state machine.
//!
//! The editor never looks inside image bytes. An external uploader hands back
//! an opaque [`AssetRef`]; each slot that can hold one (the template
//! background, every signature element) walks `Empty -> Pending -> Ready`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque image reference (URL or inline data reference).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Returns `None` for blank references, which are never valid assets.
    pub fn new(reference: impl Into<String>) -> Option<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            None
        } else {
            Some(Self(reference))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetState {
    #[default]
    Empty,
    /// Upload in flight; remembers what to fall back to if it fails.
    Pending { previous: Option<AssetRef> },
    Ready(AssetRef),
}

impl AssetState {
    pub fn from_ref(reference: Option<AssetRef>) -> Self {
        match reference {
            Some(reference) => Self::Ready(reference),
            None => Self::Empty,
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn reference(&self) -> Option<&AssetRef> {
        match self {
            Self::Ready(reference) => Some(reference),
            Self::Empty | Self::Pending { .. } => None,
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Pending { .. } => "pending",
            Self::Ready(_) => "ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    BeginUpload,
    Complete(AssetRef),
    Fail,
    Clear,
}

impl AssetEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::BeginUpload => "begin_upload",
            Self::Complete(_) => "complete",
            Self::Fail => "fail",
            Self::Clear => "clear",
        }
    }
}

pub type AssetResult<T> = std::result::Result<T, AssetError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("invalid asset transition: from {from} using event {event}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
}

/// One asset-holding slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetSlot {
    state: AssetState,
}

impl AssetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ref(reference: Option<AssetRef>) -> Self {
        Self {
            state: AssetState::from_ref(reference),
        }
    }

    pub fn state(&self) -> &AssetState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn reference(&self) -> Option<&AssetRef> {
        self.state.reference()
    }

    pub fn can_transition(&self, event: &AssetEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: &AssetEvent) -> Option<AssetState> {
        match (&self.state, event) {
            (AssetState::Empty, AssetEvent::BeginUpload) => {
                Some(AssetState::Pending { previous: None })
            }
            (AssetState::Ready(current), AssetEvent::BeginUpload) => Some(AssetState::Pending {
                previous: Some(current.clone()),
            }),
            (AssetState::Pending { .. }, AssetEvent::Complete(reference)) => {
                Some(AssetState::Ready(reference.clone()))
            }
            (AssetState::Pending { previous }, AssetEvent::Fail) => {
                Some(AssetState::from_ref(previous.clone()))
            }
            (AssetState::Empty | AssetState::Ready(_), AssetEvent::Clear) => {
                Some(AssetState::Empty)
            }
            _ => None,
        }
    }

    /// Apply `event`, returning the reference held afterwards.
    pub fn transition(&mut self, event: AssetEvent) -> AssetResult<Option<AssetRef>> {
        tracing::debug!(from = self.state.name(), event = event.name(), "asset transition");
        let next = self.next_state(&event).ok_or_else(|| {
            let from = self.state.name();
            tracing::warn!(from, event = event.name(), "invalid asset transition requested");
            AssetError::InvalidTransition {
                from,
                event: event.name(),
            }
        })?;
        self.state = next;
        Ok(self.state.reference().cloned())
    }
}
