//! Row models for the promotion table.

pub mod promotion;
