use serde::{Deserialize, Serialize};

use rondo_bus::RoleHint;

use crate::config::AppConfig;
use crate::error::AppError;

/// A node's fixed role, derived once before the round loop starts and
/// never re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Aggregates frames from every other node.
    Sink,
    /// Originates event frames and awaits acknowledgment.
    Reporter,
}

impl Role {
    /// Resolve this node's role from configuration.
    ///
    /// Pure: identity comparison against the configured sink, nothing
    /// else. Structural inconsistencies in the role configuration are
    /// fatal — the caller must halt before entering the round loop.
    pub fn resolve(config: &AppConfig) -> Result<Role, AppError> {
        if config.initiators.contains(&config.sink_id) {
            return Err(AppError::MisconfiguredRole {
                reason: format!("sink {} listed as initiator", config.sink_id),
            });
        }
        if config.node_id == config.sink_id {
            Ok(Role::Sink)
        } else {
            Ok(Role::Reporter)
        }
    }

    /// The hint handed to the bus at registration.
    pub fn hint(self) -> RoleHint {
        match self {
            Role::Sink => RoleHint::Sink,
            Role::Reporter => RoleHint::Reporter,
        }
    }
}
