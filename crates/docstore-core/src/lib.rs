pub mod collection;
pub mod convert;
pub mod document;
pub mod error;
pub mod field;
pub mod index;
pub mod store;

pub use collection::{Collection, CollectionConfig};
pub use document::Document;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use field::{DocumentField, FieldType};
pub use index::{Index, IndexRegistry, QueryParams};
pub use store::Store;
