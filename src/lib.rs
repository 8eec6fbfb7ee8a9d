#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

///
/// Trace variant logs (UVCL: unique variants with occurrence counts)
///
pub mod variant_log {
    /// [`VariantLog`] struct with interned activity labels
    pub mod variant_log_struct;

    #[doc(inline)]
    pub use variant_log_struct::VariantLog;
}

///
/// Directly-follows graphs
///
pub mod dfg {
    /// [`DirectlyFollowsGraph`] struct
    pub mod dfg_struct;

    #[doc(inline)]
    pub use crate::dfg::dfg_struct::DirectlyFollowsGraph;
}

///
/// Process trees
///
pub mod process_tree {
    /// [`ProcessTree`] struct and sub-structs
    pub mod process_tree_struct;

    #[doc(inline)]
    pub use process_tree_struct::{OperatorType, ProcessTree};
}

///
/// Module for the Inductive Miner process discovery algorithm
///
pub mod inductive {
    /// Cut detectors over the working directly-follows graph
    pub mod cuts {
        /// Parallel (concurrency) cut
        pub mod concurrency;
        /// Loop cut
        pub mod loop_cut;
        /// Sequence cut (loose and strict)
        pub mod sequence;
        /// Exclusive-choice cut
        pub mod xor;
    }
    /// Interned working DFG derived from trace variants
    pub mod dfg_projection;
    /// Fall-through handlers applied when no cut is found
    pub mod fall_through;
    /// Full Inductive Miner discovery algorithm
    pub mod full;
    /// Noise filtering of the working DFG (IMf variant)
    pub mod noise_filtering;
    /// Splitting a variant log along a detected cut
    pub mod splitting;
    /// Transitive predecessors/successors of DFG activities
    pub mod transitive_closure;
}

#[doc(inline)]
pub use inductive::full::discover_process_tree;

#[doc(inline)]
pub use inductive::full::discover_process_tree_from_log;

#[doc(inline)]
pub use inductive::full::DiscoveryError;

#[doc(inline)]
pub use inductive::full::InductiveMinerConfig;

#[doc(inline)]
pub use dfg::dfg_struct::DirectlyFollowsGraph;

#[doc(inline)]
pub use process_tree::process_tree_struct::ProcessTree;

#[doc(inline)]
pub use variant_log::variant_log_struct::VariantLog;
