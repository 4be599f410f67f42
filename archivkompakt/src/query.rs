//! Archive listing, search and document lookup.

use reqwest::StatusCode;

use crate::client::ArchivKompakt;
use crate::error::{ArchivError, ArchivResult};
use crate::models::{Archive, ArchiveIds, Document, IndexFilter, SearchPayload};

/// Outcome of [`ArchivKompakt::list_archives`].
///
/// Listing is the one call where a rejected request is a value instead of an
/// [`ArchivError`]. Network and decoding failures are still errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveListing {
    Archives(Vec<Archive>),
    Rejected { status: u16, body: String },
}

impl ArchiveListing {
    /// Convert a rejection into [`ArchivError::Api`].
    pub fn into_result(self) -> ArchivResult<Vec<Archive>> {
        match self {
            Self::Archives(archives) => Ok(archives),
            Self::Rejected { status, body } => Err(ArchivError::Api { status, body }),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl ArchivKompakt {
    /// `GET /v1/archives`.
    pub fn list_archives(&self) -> ArchivResult<ArchiveListing> {
        let url = self.session.url("v1/archives");
        let response = self.session.send(&url, self.session.get(&url))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = self.session.read_text(&url, response)?;
            tracing::warn!(status = status.as_u16(), "Archive listing rejected");
            return Ok(ArchiveListing::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ArchiveListing::Archives(
            self.session.read_json(&url, response)?,
        ))
    }

    /// Fetch the archives and return the id of the first index named
    /// `index_name`.
    pub fn index_id(&self, index_name: &str) -> ArchivResult<Option<String>> {
        let archives = self.list_archives()?.into_result()?;
        Ok(find_index_id(&archives, index_name).map(str::to_string))
    }

    /// `POST /v2/search`.
    ///
    /// `chunk_size` becomes `maxHits`. A single archive id is sent as a one
    /// element `arcIDs` list.
    pub fn search(
        &self,
        indexes: Option<Vec<IndexFilter>>,
        chunk_size: u32,
        archive_ids: Option<ArchiveIds>,
    ) -> ArchivResult<Vec<Document>> {
        self.search_with_payload(&SearchPayload::new(indexes, chunk_size, archive_ids))
    }

    /// `POST /v2/search` with a prepared payload.
    pub fn search_with_payload(&self, payload: &SearchPayload) -> ArchivResult<Vec<Document>> {
        let url = self.session.url("v2/search");
        let response = self.session.send(&url, self.session.post(&url).json(payload))?;

        if response.status() != StatusCode::OK {
            return Err(self.session.rejected(&url, response));
        }

        let documents: Vec<Document> = self.session.read_json(&url, response)?;
        tracing::debug!(hits = documents.len(), "Search finished");
        Ok(documents)
    }

    /// `GET /v1/documents/{id}`. A 404 is `Ok(None)`.
    pub fn document(&self, id: &str) -> ArchivResult<Option<Document>> {
        let url = self.session.url(&format!("v1/documents/{}", id));
        let response = self.session.send(&url, self.session.get(&url))?;

        match response.status() {
            StatusCode::OK => Ok(Some(self.session.read_json(&url, response)?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(self.session.rejected(&url, response)),
        }
    }
}

/// Id of the first index named `index_name`, scanning archives in order.
pub fn find_index_id<'a>(archives: &'a [Archive], index_name: &str) -> Option<&'a str> {
    archives
        .iter()
        .flat_map(|archive| archive.indexes.iter())
        .find(|index| index.name == index_name)
        .map(|index| index.id.as_str())
}

/// First document whose `ID` equals `id`.
pub fn find_document_by_id<'a>(documents: &'a [Document], id: &str) -> Option<&'a Document> {
    documents
        .iter()
        .find(|doc| doc.id().as_deref() == Some(id))
}
