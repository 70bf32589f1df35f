//! # Validated Models Validator
//!
//! Validation engine for declared models. This crate turns model declarations
//! from `models_core` into checked instances:
//!
//! - Type matching (primitives, containers, unions, nested models)
//! - Built-in validators (presence, numeric bounds, lengths, patterns, membership)
//! - A frozen validator registry with explicit and default checks
//! - Model instances with get/set, re-validation and conversions
//!
//! ## Example
//!
//! ```rust
//! use models_core::{FieldBuilder, ModelBuilder, TypeDescriptor, ValidatorSpec};
//! use models_validator::{Catalog, Model, ModelInput};
//!
//! let address = ModelBuilder::new("Address")
//!     .plain_field("street", TypeDescriptor::string())
//!     .plain_field("city", TypeDescriptor::string())
//!     .build()
//!     .unwrap();
//! let person = ModelBuilder::new("Person")
//!     .field(
//!         FieldBuilder::new("name", TypeDescriptor::string())
//!             .validator(ValidatorSpec::min_length(2))
//!             .build(),
//!     )
//!     .plain_field("addresses", "List[Address]".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let catalog = Catalog::builder().model(address).model(person).build().unwrap();
//!
//! let input = ModelInput::new()
//!     .field("name", "Jo")
//!     .field("addresses", models_core::Value::list([
//!         models_core::Value::dict([("street", "Main St"), ("city", "Rome")]),
//!     ]));
//! match Model::build(&catalog, "Person", input) {
//!     Ok((_, result)) if result.is_valid() => println!("Validation passed!"),
//!     Ok((_, result)) => println!("{}", result.render()),
//!     Err(e) => println!("Configuration problem: {}", e),
//! }
//! ```

mod catalog;
mod config;
mod convert;
mod engine;
mod matcher;
mod membership;
mod model;
mod numeric;
mod presence;
mod registry;
mod text;
mod validator;
mod walker;

pub mod checks;

pub use catalog::{Catalog, CatalogBuilder};
pub use config::*;
pub use convert::materialize;
pub use membership::*;
pub use model::*;
pub use numeric::*;
pub use presence::*;
pub use registry::*;
pub use text::*;
pub use validator::*;
