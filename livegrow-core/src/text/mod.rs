//! Text layout for fixed-pitch displays

pub mod wrap;

pub use wrap::{wrap, Line, Wrap, LINE_CAPACITY, MAX_COLUMNS};
