//! Load stage: key resolution, dimension and fact loading, batch coordination

pub mod batch;
pub mod facts;
pub mod loader;
pub mod resolver;
pub mod transaction;

pub use batch::BatchCoordinator;
pub use facts::{assemble_facts, insert_facts, FactAssembly};
pub use loader::{load_dimension, DimensionLoadReport};
pub use resolver::{
    build_date_map, build_dimension_map, build_natural_key_map, DateKeyMap, DimensionSnapshot,
    NaturalKey, NaturalKeyMap, NULL_SENTINEL,
};
pub use transaction::ScopedTransaction;
