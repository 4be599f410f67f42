//! ArchivKompakt - client for the Archiv Kompakt document archive REST API
//!
//! The library authenticates once with a password grant, then lists archives,
//! searches, fetches document metadata and downloads files whose MD5 is
//! checked against the checksum embedded in the download descriptor.
//!
//! All calls are blocking. Logging goes through `tracing`; installing a
//! subscriber is left to the application.

pub mod client;
pub mod config;
pub mod descriptor;
pub mod download;
pub mod error;
pub mod models;
pub mod query;
pub mod session;

pub use client::ArchivKompakt;
pub use config::{ClientConfig, ClientCredentials};
pub use descriptor::DownloadDescriptor;
pub use download::DownloadReport;
pub use error::{ArchivError, ArchivResult, DescriptorError};
pub use models::{
    parse_creation_date, Archive, ArchiveIds, ArchiveIndex, Document, IndexFilter, SearchPayload,
    DEFAULT_CHUNK_SIZE,
};
pub use query::{find_document_by_id, find_index_id, ArchiveListing};
pub use session::Session;
pub use tokio_util::sync::CancellationToken;
