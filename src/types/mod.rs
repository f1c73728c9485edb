//! Payload providers for concrete log event types.

pub mod git_state;

use std::sync::Arc;

use crate::{error::Result, provider::ProviderRegistry};

pub use git_state::{GitState, GitStateProvider, GIT_STATE_EVENT_CODE};

/// Registry holding every provider defined in this crate.
pub fn builtin_registry() -> Result<ProviderRegistry> {
    ProviderRegistry::new().with(Arc::new(GitStateProvider))
}
