//! Ownership-based authorization.
//!
//! One predicate covers every resource kind: reads are always allowed,
//! writes only for the owner.  Each resource supplies its owner through the
//! [`Owned`] trait rather than through resource-specific branching. Like
//! and Comment point it at their author field, everything else at `owner`.

use uuid::Uuid;

/// The kind of access being requested.  Write covers update and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotOwner,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Owner extraction seam, implemented per resource kind.
pub trait Owned {
    /// The user id that determines write-eligibility for this resource.
    fn owner_id(&self) -> Uuid;
}

/// Decide whether `requester` may perform `op` on `resource`.
///
/// `requester` is `None` for unauthenticated callers, who can still read
/// everything.
pub fn authorize(requester: Option<Uuid>, resource: &impl Owned, op: Operation) -> Decision {
    match op {
        Operation::Read => Decision::Allow,
        Operation::Write => match requester {
            Some(id) if id == resource.owner_id() => Decision::Allow,
            _ => Decision::Deny(DenyReason::NotOwner),
        },
    }
}

/// Convenience for serializers: whether `requester` owns `resource`.
pub fn is_owner(requester: Option<Uuid>, resource: &impl Owned) -> bool {
    authorize(requester, resource, Operation::Write).is_allowed()
}
