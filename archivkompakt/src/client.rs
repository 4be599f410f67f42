//! The client facade.

use crate::config::ClientConfig;
use crate::error::ArchivResult;
use crate::session::Session;

/// Client for one Archiv Kompakt endpoint.
///
/// Construction authenticates; every other call reuses the session's token.
/// Query operations live in [`crate::query`], file downloads in
/// [`crate::download`].
///
/// # Example
///
/// ```no_run
/// use archivkompakt::{ArchivKompakt, ClientConfig, ClientCredentials};
///
/// let config = ClientConfig::new(
///     "https://archive.example.com",
///     "user",
///     "password",
///     "archive",
///     ClientCredentials::client_secret("client-id", "client-secret"),
/// );
/// let archiv = ArchivKompakt::connect(&config)?;
/// let archives = archiv.list_archives()?.into_result()?;
/// # Ok::<(), archivkompakt::ArchivError>(())
/// ```
#[derive(Debug)]
pub struct ArchivKompakt {
    pub(crate) session: Session,
}

impl ArchivKompakt {
    /// Open a session and wrap it.
    pub fn connect(config: &ClientConfig) -> ArchivResult<Self> {
        Ok(Self::from_session(Session::create(config)?))
    }

    /// Wrap a session that is already open.
    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// The authenticated session behind this client.
    pub fn session(&self) -> &Session {
        &self.session
    }
}
