//! # Validated Models Core
//!
//! Core data structures and types for the Validated Models Engine.
//!
//! This crate provides the building blocks for declaring validated model
//! types and describing what went wrong when a value does not conform.
//!
//! ## Key Concepts
//!
//! - **Value**: the dynamic representation of a field value
//! - **TypeDescriptor**: the structural shape a field accepts
//! - **ValidatorSpec**: configuration of a validator explicitly attached to a field
//! - **ModelSchema**: a named model type with fields in declaration order
//! - **ValidationResult**: the collected field-level failures, with rendered diagnostics
//!
//! ## Example
//!
//! ```rust
//! use models_core::{FieldBuilder, ModelBuilder, TypeDescriptor, ValidatorSpec};
//!
//! let address = ModelBuilder::new("Address")
//!     .plain_field("street", TypeDescriptor::string())
//!     .plain_field("city", TypeDescriptor::string())
//!     .build()
//!     .unwrap();
//!
//! let user = ModelBuilder::new("User")
//!     .field(
//!         FieldBuilder::new("name", TypeDescriptor::string())
//!             .validator(ValidatorSpec::min_length(1))
//!             .build(),
//!     )
//!     .plain_field("addresses", "List[Address]".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(user.field("addresses").unwrap().descriptor.referenced_models(), vec!["Address"]);
//! # let _ = address;
//! ```

pub mod builder;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod schema;
pub mod value;

pub use builder::*;
pub use descriptor::*;
pub use diagnostics::*;
pub use error::*;
pub use schema::*;
pub use value::*;
