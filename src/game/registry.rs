use tokio::sync::mpsc;

use crate::game::session::SessionEvent;
use crate::game::PlayerId;

/// A registered client: its identity plus the channel its events go out on.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub identity: PlayerId,
    pub endpoint: String,
    outbound: mpsc::UnboundedSender<SessionEvent>,
}

impl ClientHandle {
    /// Fails only when the receiving side has gone away.
    pub fn send(&self, event: SessionEvent) -> Result<(), mpsc::error::SendError<SessionEvent>> {
        self.outbound.send(event)
    }
}

/// Connected clients in join order. Identities start at 1 and are never reused.
#[derive(Debug)]
pub struct SessionRegistry {
    handles: Vec<ClientHandle>,
    next_identity: PlayerId,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            next_identity: 1,
        }
    }

    /// Returns the identity for `endpoint`, registering it if it is new.
    /// The flag is `false` when the endpoint was already registered.
    pub fn register(
        &mut self,
        endpoint: &str,
        outbound: mpsc::UnboundedSender<SessionEvent>,
    ) -> (PlayerId, bool) {
        if let Some(identity) = self.identity_of(endpoint) {
            return (identity, false);
        }

        let identity = self.next_identity;
        self.next_identity += 1;
        self.handles.push(ClientHandle {
            identity,
            endpoint: endpoint.to_string(),
            outbound,
        });
        (identity, true)
    }

    /// Removes `identity`, returning the position it held. Unknown identities are ignored.
    pub fn unregister(&mut self, identity: PlayerId) -> Option<usize> {
        let position = self.position(identity)?;
        self.handles.remove(position);
        Some(position)
    }

    pub fn identity_of(&self, endpoint: &str) -> Option<PlayerId> {
        self.handles
            .iter()
            .find(|handle| handle.endpoint == endpoint)
            .map(|handle| handle.identity)
    }

    pub fn position(&self, identity: PlayerId) -> Option<usize> {
        self.handles
            .iter()
            .position(|handle| handle.identity == identity)
    }

    pub fn get(&self, position: usize) -> Option<&ClientHandle> {
        self.handles.get(position)
    }

    pub fn handle(&self, identity: PlayerId) -> Option<&ClientHandle> {
        self.handles.iter().find(|handle| handle.identity == identity)
    }

    pub fn count(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn ordered_identities(&self) -> Vec<PlayerId> {
        self.handles.iter().map(|handle| handle.identity).collect()
    }

    pub fn handles(&self) -> &[ClientHandle] {
        &self.handles
    }
}
