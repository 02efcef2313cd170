// Landscape: literature landscape analysis for document collections.
//
// This is the library root. Each module corresponds to a stage of the
// document-to-report pipeline.

pub mod config;
pub mod corpus;
pub mod extract;
pub mod pipeline;
pub mod policy;
pub mod report;
pub mod stats;
pub mod status;
pub mod text;
pub mod topics;
pub mod viz;
