//! Source of the current actor's name.
//!
//! The audit service only needs a name to attribute entries to, so it depends
//! on this capability rather than on the authentication component itself.

/// Supplies the name of the currently authenticated actor, if any.
pub trait ActorSource: Send + Sync {
    fn current_actor(&self) -> Option<String>;
}

/// Actor source that never reports an actor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoActor;

impl ActorSource for NoActor {
    fn current_actor(&self) -> Option<String> {
        None
    }
}
