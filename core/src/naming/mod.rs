//! Metadata carried by archive and member file names.

pub mod archive;
pub mod member;

pub use archive::ArchiveName;
pub use member::{FileType, MemberDescriptor};
