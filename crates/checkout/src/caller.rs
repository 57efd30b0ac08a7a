use common::{Credential, Identity};

/// The verified caller of a workflow operation.
///
/// The credential is kept so it can be forwarded to collaborators that
/// authenticate the caller themselves.
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: Identity,
    pub credential: Credential,
}

impl Caller {
    pub fn new(identity: Identity, credential: Credential) -> Self {
        Self {
            identity,
            credential,
        }
    }

    /// Returns true if the caller may manage every order.
    pub fn is_staff(&self) -> bool {
        self.identity.is_staff
    }
}
