#![forbid(unsafe_code)]

//! Data model for logical-expression tree diagrams.
//!
//! A tree of named nodes joined by `AND`/`OR` operators, some annotated with a
//! comparison marker. The model owns the only mutable cross-pass state: the
//! per-node `collapsed` flag. Everything downstream (sizing, layout, the
//! rendered element set) is recomputed from this model on every pass.

pub mod config;
pub mod geom;
pub mod model;

pub use config::DsTreeConfig;
pub use model::{ConditionMarker, OperatorTag, TreeModel, TreeNode};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid tree data: {0}")]
    InvalidTreeData(#[from] serde_json::Error),
    #[error("duplicate node name: {name}")]
    DuplicateName { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
