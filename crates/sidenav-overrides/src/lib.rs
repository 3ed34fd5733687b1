//! Override sidecars for sidenav.
//!
//! Humans customize the generated navigation by editing small JSON files kept
//! beside the site configuration, one per override kind and directory scope.
//! This crate owns those files:
//!
//! - [`OverrideStore`] reads and writes the override values
//! - [`MetadataStore`] tracks provenance for every value (hash, user-set,
//!   active) so regeneration never overwrites a human edit
//! - [`ArchiveService`] snapshots sidecars of removed directories for later
//!   restoration
//!
//! Plain reads never fail: missing or malformed files are empty. Reads that
//! precede a rewrite use `load`, which reports malformed files so they are
//! never overwritten. Writes only touch the disk when content changed.

mod archive;
mod error;
mod json_file;
mod layout;
mod metadata;
mod store;

pub use archive::{ArchiveService, ArchivedDirectory, REASON_DIRECTORY_REMOVED};
pub use error::{StoreError, StoreErrorKind};
pub use layout::{
    OverrideKind, ROOT_SIGNATURE, SELF_KEY, SidecarLayout, child_signature, signature_for,
    signature_path,
};
pub use metadata::{
    MetadataEntry, MetadataRecord, MetadataStore, is_user_modified, value_hash,
};
pub use store::{OverrideRecord, OverrideStore};
