//! Collaborators the merge engine depends on, with one concrete
//! implementation of each, plus the file-level read path.

pub mod container;
pub mod decoder;
pub mod persistence;
pub mod reader;
pub mod sources;

pub use container::{
    open_container, ContainerReader, DirectoryContainer, MemoryContainer, TarContainer,
};
pub use decoder::{Decoder, JsonDecoder};
pub use persistence::{JsonStore, Persistence};
pub use reader::{
    inflate_if_gzipped, merge_container, merge_container_with, merge_parameter_files,
    merge_raw_files, read_object, read_parameter_files, sort_case_insensitive, validate_file,
};
pub use sources::{node_of, PassThroughSources, SiteTable, SourceTable};
