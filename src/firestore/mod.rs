pub mod client;
pub mod value;

pub use client::{Document, FirestoreClient, FirestoreError};
