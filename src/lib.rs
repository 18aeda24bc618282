//! Preprocessing for collections of learning curves.
//!
//! Drops curves that are too short once missing values are removed, or flat
//! enough to carry no signal, either in one dataset ([`clean_curves`]) or
//! across aligned train / validation / test splits ([`clean_curves_together`]).
//! Surviving samples can then be relabeled from learner to learner group
//! ([`filter_by_group_definitions`]).

pub mod clean;
pub mod config;
pub mod data;
pub mod error;
pub mod group;
pub mod pairs;

pub use clean::{
    clean_curves, clean_curves_together, is_flat, strip_missing, validate_curve, CleanStats,
    CleanedAligned, CleanedSet, CurveCheck, Rejection,
};
pub use config::CleaningConfig;
pub use data::model::{AlignedDatasets, Curve, Dataset, GroupDefinitions, Label, NameRegistry};
pub use error::PrepError;
pub use group::{
    filter_by_group_definitions, filter_by_group_definitions_together, GroupIndex, Grouped,
    GroupedAligned,
};
pub use pairs::{combinations, get_all_pairs, pairs, Combinations};
