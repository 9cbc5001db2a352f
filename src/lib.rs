//! OpenAPI From Forms - Schema definitions synthesized from form type metadata.
//!
//! This library generates OpenAPI/Swagger schema definitions by introspecting
//! form type definitions: given a model (a form type plus construction
//! options), it derives an object definition with one property per exposed
//! field. Fields whose type is itself a form type are registered as child
//! models and referenced via `$ref`, expanding a type graph into a flat,
//! deduplicated table of named definitions.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`form`] - Form type definitions, ancestor chains, field introspection
//! 2. [`model`] - Models (type identity + options) and their identity keys
//! 3. [`schema`] - The schema object model and documentation-fragment merging
//! 4. [`registry`] - Deduplicating model registry with stable reference names
//! 5. [`describer`] - Describers that synthesize a definition for a model
//! 6. [`generator`] - Drives the registry work queue over all describers
//! 7. [`document`] - Wraps the definitions table in an API document
//! 8. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_forms::{
//!     describer::FormModelDescriber,
//!     document::DocumentBuilder,
//!     form::{FieldDeclaration, FormOptions, FormTypeDefinition, FormTypeRegistry},
//!     generator::DefinitionGenerator,
//!     model::Model,
//!     serializer::serialize_yaml,
//! };
//!
//! // Declare form types on top of the builtin kinds
//! let mut types = FormTypeRegistry::builtin();
//! types.register(
//!     FormTypeDefinition::new("UserType")
//!         .parent("form")
//!         .field(FieldDeclaration::new("username", "text"))
//!         .field(FieldDeclaration::new("age", "integer").required(false)),
//! );
//!
//! // Register the root model and generate all reachable definitions
//! let describer = FormModelDescriber::new(types);
//! let mut generator = DefinitionGenerator::new(vec![Box::new(describer)]);
//! generator.register(Model::new("UserType", FormOptions::new()));
//!
//! let document = DocumentBuilder::new().build(generator).unwrap();
//! let yaml = serialize_yaml(&document).unwrap();
//! assert!(yaml.contains("UserType"));
//! ```

pub mod describer;
pub mod document;
pub mod error;
pub mod form;
pub mod generator;
pub mod model;
pub mod registry;
pub mod schema;
pub mod serializer;
