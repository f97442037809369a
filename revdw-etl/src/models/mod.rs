//! Typed records flowing through the transform and load stages

pub mod batch;
pub mod dimension;
pub mod fact;
pub mod record;

pub use batch::*;
pub use dimension::*;
pub use fact::*;
pub use record::*;
