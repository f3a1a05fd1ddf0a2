//! Scoped acquisition of an authenticated connection.

use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{MayanError, Result};
use crate::graph::Client;
use crate::transport::{HttpTransport, MockTransport, Transport};

/// Something that can open a transport for one session.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn Transport>>;
}

impl Connector for ConnectionConfig {
    fn connect(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(HttpTransport::connect(self)?))
    }
}

impl Connector for Arc<MockTransport> {
    fn connect(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::clone(self) as Arc<dyn Transport>)
    }
}

/// An open connection rooted at the API base URL.
///
/// The transport is shut down when the session is dropped, which covers
/// normal return, early return via `?`, panics and cancellation of the
/// enclosing task alike.
pub struct ClientSession {
    transport: Arc<dyn Transport>,
}

impl ClientSession {
    pub fn open<C: Connector + ?Sized>(connector: &C) -> Result<Self> {
        let transport = connector.connect()?;
        debug!(root = %transport.root(), "session opened");
        Ok(Self { transport })
    }

    /// Root resource for this session.
    pub fn client(&self) -> Client {
        Client::new(Arc::clone(&self.transport))
    }

    /// Open a session, run `body` against its root client, close the session.
    ///
    /// Returns whatever `body` returns; the session is released on every
    /// exit path.
    pub async fn run<C, F, Fut, T, E>(connector: &C, body: F) -> std::result::Result<T, E>
    where
        C: Connector + ?Sized,
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<MayanError>,
    {
        let session = Self::open(connector)?;
        let result = body(session.client()).await;
        drop(session);
        result
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        self.transport.shutdown();
        debug!(root = %self.transport.root(), "session closed");
    }
}
