//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept a pool or connection as the first argument.

pub mod promotion_repo;

pub use promotion_repo::PromotionRepo;
