//! Storage client seam.
//!
//! The backing network is an external collaborator: the harness treats
//! upload/delete/list/create-directory as opaque RPC calls and only consumes
//! the listing records for consistency verification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Remote listing record, the consistency oracle.
///
/// Entries are looked up by name and compared by predicate; listing order is
/// irrelevant. Serialization matches the listing wire format (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub is_file: bool,
    /// 0–100; 100 means every chunk is committed on-chain.
    pub uploading_progress: u8,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>, uploading_progress: u8) -> Self {
        Self {
            name: name.into(),
            is_file: true,
            uploading_progress,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_file: false,
            uploading_progress: 0,
        }
    }
}

/// Opaque client for the backing storage network.
///
/// All calls are asynchronous network round-trips; retry policy, if any,
/// belongs to the caller.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Uploads `bytes` as `name` under `owner`, returns the storage path.
    async fn upload_file(
        &self,
        owner: &str,
        name: &str,
        bytes: &[u8],
        credential: &str,
    ) -> Result<String>;

    async fn delete_file(&self, owner: &str, name: &str, credential: &str) -> Result<()>;

    async fn create_directory(&self, owner: &str, name: &str, credential: &str) -> Result<()>;

    async fn delete_directory(&self, owner: &str, name: &str, credential: &str) -> Result<()>;

    /// Lists the root namespace of `owner` (address without `0x` prefix).
    async fn list_directory(&self, owner: &str) -> Result<Vec<DirectoryEntry>>;
}

/// Listing namespaces are addressed without the `0x` prefix.
pub fn strip_hex_prefix(address: &str) -> &str {
    address.strip_prefix("0x").unwrap_or(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hex_prefix_once() {
        assert_eq!(strip_hex_prefix("0xabc123"), "abc123");
        assert_eq!(strip_hex_prefix("abc123"), "abc123");
        assert_eq!(strip_hex_prefix("0x0xabc"), "0xabc");
    }

    #[test]
    fn listing_records_use_the_wire_field_names() {
        let entry: DirectoryEntry = serde_json::from_str(
            r#"{"name":"testFile","isFile":true,"uploadingProgress":100}"#,
        )
        .unwrap();
        assert_eq!(entry, DirectoryEntry::file("testFile", 100));
    }
}
