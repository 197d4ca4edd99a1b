//! Operation model: what the scenario asks the page to do, how many wallet
//! confirmations that takes, and which title marks it finished.

use crate::error::{HarnessError, Result};

/// Storage operation triggered through the page under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Read path: no transaction, no wallet round.
    Download,
    Upload,
    DeleteFile,
    CreateDirectory,
    DeleteDirectory,
}

impl OperationKind {
    /// Page title that signals UI-visible completion of this operation.
    pub const fn completion_title(&self) -> &'static str {
        match self {
            Self::Download => "Downloaded",
            Self::Upload => "Uploaded",
            Self::DeleteFile => "Deleted",
            Self::CreateDirectory => "Directory created",
            Self::DeleteDirectory => "Directory deleted",
        }
    }

    pub fn completion_signal(&self) -> CompletionSignal {
        CompletionSignal::new(self.completion_title())
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Download => "download",
            Self::Upload => "upload",
            Self::DeleteFile => "deleteFile",
            Self::CreateDirectory => "createDirectory",
            Self::DeleteDirectory => "deleteDirectory",
        };
        f.write_str(name)
    }
}

/// Expected terminal page title for one operation.
///
/// Exactly one signal terminates the wait for a given request; comparison is
/// string equality against the document title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSignal(String);

impl CompletionSignal {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn title(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered count of wallet confirmation rounds for one operation kind.
///
/// The count is fixed per kind and known before execution begins; it is
/// never discovered from extension behavior. Upload submits three
/// transactions (reserve, chunks, finish), directory mutations and file
/// deletion submit one, download submits none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPlan {
    kind: OperationKind,
    rounds: u32,
}

impl ConfirmationPlan {
    pub fn for_kind(kind: OperationKind) -> Self {
        let rounds = match kind {
            OperationKind::Download => 0,
            OperationKind::Upload => 3,
            OperationKind::DeleteFile
            | OperationKind::CreateDirectory
            | OperationKind::DeleteDirectory => 1,
        };
        Self { kind, rounds }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

/// UI action under test: operation kind plus the inputs the page needs.
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub kind: OperationKind,
    /// Target path within the actor's namespace (file or directory name,
    /// or a full storage path for download).
    pub path: String,
    /// On-chain address performing the operation.
    pub actor: String,
    /// Payload bytes, for round-trip verification of uploads/downloads.
    pub payload: Option<Vec<u8>>,
}

impl OperationRequest {
    pub fn new(kind: OperationKind, path: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            actor: actor.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Path and actor must be supplied before a UI trigger is invoked.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(HarnessError::Config(format!(
                "{} request has an empty target path",
                self.kind
            )));
        }
        if self.actor.is_empty() {
            return Err(HarnessError::Config(format!(
                "{} request has an empty actor address",
                self.kind
            )));
        }
        Ok(())
    }

    pub fn plan(&self) -> ConfirmationPlan {
        ConfirmationPlan::for_kind(self.kind)
    }
}
