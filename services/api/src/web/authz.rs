//! services/api/src/web/authz.rs
//!
//! The single ownership check used by every handler that touches a stored
//! resource. The store itself performs no authorization, so nothing may
//! reach it on a user's behalf without passing through here first.

use studylens_core::domain::{AiSession, Source};
use studylens_core::ports::{PortError, PortResult};

/// A stored resource with an owning user.
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
    fn kind() -> &'static str;
}

impl OwnedResource for AiSession {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
    fn kind() -> &'static str {
        "Session"
    }
}

impl OwnedResource for Source {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
    fn kind() -> &'static str {
        "Source"
    }
}

/// Allows access only to the resource's owner. Denials are masked as
/// NotFound so callers cannot probe for other users' resource ids.
pub fn authorize<R: OwnedResource>(requester_id: &str, resource: &R) -> PortResult<()> {
    if resource.owner_id() == requester_id {
        Ok(())
    } else {
        Err(PortError::NotFound(format!("{} not found", R::kind())))
    }
}
