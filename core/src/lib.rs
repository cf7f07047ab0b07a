pub mod catalog;
pub mod error;
pub mod index;
pub mod language;
pub mod loader;
pub mod tokenizer;

pub use catalog::{CatalogRow, RawCourse, Table};
pub use error::{BuildError, IndexError, SchemaError};
pub use index::{Hit, IndexOptions, RetrievalIndex};
