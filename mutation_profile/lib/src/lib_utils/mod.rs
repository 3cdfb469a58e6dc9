pub mod aggregate;
pub mod alignment;
pub mod consensus;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod frequency;
pub mod pipeline;
pub mod residue;
pub mod struct_helper;
pub mod variant;
