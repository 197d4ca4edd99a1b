//! Consistency verification against a directory-listing snapshot.
//!
//! A UI completion signal only says the page believes the operation
//! finished. These checks query-independent state: the caller fetches a
//! listing from the storage client and asserts the end state here.
//!
//! The listing round-trip can race the UI signal and return a stale view;
//! by contract these functions do not retry. Backoff policy belongs to the
//! caller.

use crate::error::{HarnessError, Result};
use crate::storage::DirectoryEntry;

/// Asserts `listing` contains an entry named `name` satisfying `predicate`.
///
/// `description` names the expectation in the mismatch message, e.g.
/// `"uploading_progress == 100"`.
pub fn assert_present(
    listing: &[DirectoryEntry],
    name: &str,
    predicate: impl Fn(&DirectoryEntry) -> bool,
    description: &str,
) -> Result<()> {
    match listing.iter().find(|entry| entry.name == name) {
        None => Err(HarnessError::AssertionMismatch {
            name: name.to_string(),
            detail: "entry not found in listing".to_string(),
        }),
        Some(entry) if !predicate(entry) => Err(HarnessError::AssertionMismatch {
            name: name.to_string(),
            detail: format!("entry does not satisfy: {description} (got {entry:?})"),
        }),
        Some(_) => Ok(()),
    }
}

/// Asserts `listing` contains no entry named `name`.
pub fn assert_absent(listing: &[DirectoryEntry], name: &str) -> Result<()> {
    match listing.iter().find(|entry| entry.name == name) {
        Some(entry) => Err(HarnessError::AssertionMismatch {
            name: name.to_string(),
            detail: format!("entry unexpectedly present: {entry:?}"),
        }),
        None => Ok(()),
    }
}
