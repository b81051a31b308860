//! This module contains a population model for evolutionary program search: program
//! records with lineage, islands with quality-diversity feature grids and a store
//! which owns them all.

mod features;
pub use self::features::*;

mod island;
pub use self::island::*;

mod program;
pub use self::program::*;

mod store;
pub use self::store::*;
