pub mod normalizer;

pub use normalizer::{normalize, TimeNormalizer, ACQUISITION_UPDATE_MINUTES};
