//! MongoDB layer: client wrapper, document schemas, and the
//! `ActivitySource` implementation backed by real collections.

pub mod mongo;
pub mod schemas;
pub mod source;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection};
pub use source::MongoActivitySource;
