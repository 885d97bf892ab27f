// Authorization Guard
//
// Decision: Policy is an object handed to the workflow at call time
// Decision: Default policy is a single configured operator, equality check only

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// The identity invoking a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Platform user id (0 when the platform did not supply one)
    pub id: u64,
    /// Display name, for logs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Actor {
    pub fn new(id: u64) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Equality check between the actor and the configured owner
///
/// An absent (zero) actor id never matches.
pub fn authorize(actor: &Actor, owner_id: u64) -> bool {
    actor.id != 0 && actor.id == owner_id
}

/// Decides whether an actor may run a privileged workflow
///
/// Implementations must not fail; a denial is `false`.
pub trait AuthorizationPolicy: Send + Sync {
    fn authorize(&self, actor: &Actor) -> bool;
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&Actor) -> bool + Send + Sync,
{
    fn authorize(&self, actor: &Actor) -> bool {
        self(actor)
    }
}

/// Exactly one authorized operator per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleOperatorPolicy {
    owner_id: u64,
}

impl SingleOperatorPolicy {
    pub fn new(owner_id: u64) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }
}

impl AuthorizationPolicy for SingleOperatorPolicy {
    fn authorize(&self, actor: &Actor) -> bool {
        authorize(actor, self.owner_id)
    }
}

/// Turn a policy denial into `Unauthorized`
pub fn ensure_authorized(policy: &dyn AuthorizationPolicy, actor: &Actor) -> Result<()> {
    if policy.authorize(actor) {
        Ok(())
    } else {
        Err(BotError::Unauthorized { actor_id: actor.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: u64 = 184_467_440_737_095_516;

    #[test]
    fn test_owner_is_authorized() {
        assert!(authorize(&Actor::new(OWNER), OWNER));
    }

    #[test]
    fn test_other_actors_are_denied() {
        for id in [0, 1, OWNER - 1, OWNER + 1, u64::MAX] {
            assert!(!authorize(&Actor::new(id), OWNER), "id {} should be denied", id);
        }
    }

    #[test]
    fn test_zero_actor_never_matches() {
        assert!(!authorize(&Actor::new(0), 0));
    }

    #[test]
    fn test_single_operator_policy() {
        let policy = SingleOperatorPolicy::new(OWNER);
        assert!(policy.authorize(&Actor::new(OWNER).with_name("owner")));
        assert!(!policy.authorize(&Actor::new(42)));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |actor: &Actor| actor.id % 2 == 0;
        assert!(ensure_authorized(&policy, &Actor::new(4)).is_ok());
        let err = ensure_authorized(&policy, &Actor::new(5)).unwrap_err();
        assert!(matches!(err, BotError::Unauthorized { actor_id: 5 }));
    }
}
