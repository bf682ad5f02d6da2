use crate::{
    auth::{error::AuthError, observer::AuthObserver},
    session::SessionStore,
    vault::{AuthorizedClient, OnReject},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const FILES_LIST_PATH: &str = "/files/list";

/// File entry as returned by the list endpoint. Optional fields are absent for
/// older records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub owner_username: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub upload_timestamp: Option<String>,
    #[serde(default)]
    pub visibility_type: Option<String>,
    #[serde(default)]
    pub can_download: bool,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl<S: SessionStore, O: AuthObserver> AuthorizedClient<S, O> {
    /// Files visible to the signed-in user. A rejected token signs the user out.
    ///
    /// # Errors
    /// See [`AuthorizedClient::get_json`].
    #[instrument(skip(self))]
    pub async fn list_files(&mut self) -> Result<Vec<FileMetadata>, AuthError> {
        self.get_json(FILES_LIST_PATH, OnReject::SignOut).await
    }
}
