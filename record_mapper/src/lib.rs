//! Record Mapper - struct to value map conversion for RowHaus
//!
//! This crate provides the record metadata model, the metadata cache, and
//! the serializer / deserializer pair driven by the value converter.

// Generated code refers to this crate by name
extern crate self as record_mapper;

pub mod cache;
pub mod deserializer;
pub mod errors;
pub mod mapper;
pub mod metadata;
pub mod prelude;
pub mod serializer;
pub mod values;

pub use cache::MetadataCache;
pub use errors::MapperError;
pub use mapper::Mapper;
pub use metadata::{Arguments, Constructor, FieldDescriptor, Parameter, Record, TypeMetadata};
pub use values::ValueMap;

// Derive macros share their names with the traits they implement
pub use record_derive::{model, Record, Wrapper};

// Re-export the conversion crate used by generated code and the public API
pub use type_mapping;
