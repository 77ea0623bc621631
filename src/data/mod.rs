//! Data module - score table building and boundary joining

pub mod boundaries;
pub mod score_table;

pub use boundaries::{join_scores, load_boundaries, BoundaryLoadError, ZipFeature};
pub use score_table::{load_score_table, DataFormatError, ScoreRecord, ScoreTable};
