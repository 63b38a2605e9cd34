pub mod client;
pub mod indexes;

pub use client::MongoClient;

use crate::error::DatabaseError;
use mongodb::bson::{self, Bson, Document};
use serde::Serialize;

/// Serialize a value into a BSON document.
pub trait ToDocument {
    fn to_document(&self) -> Result<Document, DatabaseError>;
}

impl<T: Serialize> ToDocument for T {
    fn to_document(&self) -> Result<Document, DatabaseError> {
        let doc = bson::to_bson(self)?;

        if let Bson::Document(doc) = doc {
            Ok(doc)
        } else {
            Err(DatabaseError::FailedToSerializeDocument(format!("Failed to serialize document: {}", doc)))
        }
    }
}
