// Core modules implementing line trimming, traversal, and error modeling.
pub mod error;
pub mod trim;
pub mod walk;
