//! Credential gate guarding premium-tier model usage.

use crate::error::{Result, StudioError};
use crate::gemini::API_KEY_ENV;
use crate::types::ModelTier;
use std::sync::Arc;

/// Host-provided credential facilities.
///
/// The host may or may not offer key selection at all. When it does not,
/// the gate is constructed without a host and stays hidden.
pub trait CredentialHost: Send + Sync {
    /// Reports whether the user currently has an API key selected.
    fn has_selected_key(&self) -> bool;

    /// Opens the host's key selection flow.
    fn open_key_selector(&self) -> Result<()>;
}

/// Credential host backed by the process environment.
///
/// A key counts as selected when `GEMINI_API_KEY` is set and non-empty.
/// The environment has no interactive selector, so remediation always
/// reports [`StudioError::SelectorUnavailable`].
#[derive(Debug, Default)]
pub struct EnvCredentialHost;

impl CredentialHost for EnvCredentialHost {
    fn has_selected_key(&self) -> bool {
        std::env::var(API_KEY_ENV)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    fn open_key_selector(&self) -> Result<()> {
        Err(StudioError::SelectorUnavailable)
    }
}

/// Visibility of the key-selection prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// The prompt is not displayed.
    #[default]
    Hidden,
    /// The prompt is displayed and blocks submissions.
    Shown,
}

/// Two-state machine deciding when the key prompt is visible.
#[derive(Clone)]
pub struct KeyGate {
    host: Option<Arc<dyn CredentialHost>>,
    state: GateState,
}

impl KeyGate {
    /// Creates a gate, hidden initially.
    pub fn new(host: Option<Arc<dyn CredentialHost>>) -> Self {
        Self {
            host,
            state: GateState::Hidden,
        }
    }

    /// Current gate state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// True when the prompt is currently displayed.
    pub fn is_shown(&self) -> bool {
        self.state == GateState::Shown
    }

    /// Re-evaluates visibility for the given model tier.
    ///
    /// The gate shows only when the tier requires a selected key and the
    /// host reports none. Without a host there is nothing to check and
    /// the gate hides.
    pub fn refresh(&mut self, model: ModelTier) {
        self.state = match &self.host {
            Some(host) if model.requires_selected_key() && !host.has_selected_key() => {
                GateState::Shown
            }
            _ => GateState::Hidden,
        };
    }

    /// Forces the gate open after an authentication failure.
    pub fn notify_auth_failure(&mut self) {
        self.state = GateState::Shown;
    }

    /// Runs the host's key selection flow and hides the gate.
    ///
    /// Dismissal is optimistic: the host is not asked again whether a key
    /// is now selected, since selection may not be reflected immediately.
    /// A still-missing key surfaces as an auth error on the next submit.
    pub fn select_key(&mut self) -> Result<()> {
        let host = self
            .host
            .as_ref()
            .ok_or(StudioError::SelectorUnavailable)?;
        host.open_key_selector()?;
        self.state = GateState::Hidden;
        Ok(())
    }
}
