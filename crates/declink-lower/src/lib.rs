//! Lazy lowering of semantic declarations into linkable declarations.
//!
//! This crate provides:
//! - `LoweringSession` - the per-compilation front code generation talks to
//! - `DeclarationStorage` - the identity map from semantic declarations to
//!   linkable declarations
//! - `LinkDecl` - linkable declarations whose fields are computed on first read
//! - `FakeOverrideGenerator` - synthetic overrides for inherited members
//! - `TypeConverter` - structural semantic → link-time type conversion
//! - `ClassifierCache` - type parameter identities per declaration

pub mod classifier_cache;
pub mod declaration;
pub mod declaration_storage;
pub mod diagnostics;
pub mod dump;
pub mod error;
mod evaluate;
pub mod fake_override;
pub mod hierarchy;
pub mod ids;
pub mod lazy;
pub mod options;
pub mod session;
pub mod signature;
pub mod substitution;
pub mod type_converter;
pub mod types;

pub use classifier_cache::{ClassifierCache, TypeParameterInfo};
pub use declaration::{
    LinkAnnotation, LinkDecl, LinkDeclKind, LinkExpr, LinkOrigin, ParameterKind, ValueParameter,
};
pub use declaration_storage::{DeclarationStorage, LocalScope, ScopeGuard};
pub use diagnostics::{DiagnosticCollector, DiagnosticSink, TracingSink};
pub use dump::{DeclDump, DumpFilter, ParamDump};
pub use error::{LoweringError, LoweringResult};
pub use fake_override::{ClassScope, FakeOverrideGenerator, FakeOverrides, ScopeMember};
pub use ids::{DeclKey, LinkDeclId, TypeParameterId};
pub use options::LoweringOptions;
pub use session::LoweringSession;
pub use type_converter::{ClassifierResolver, TypeConverter};
pub use types::{LinkType, LinkTypeArg};

#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
