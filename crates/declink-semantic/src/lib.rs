//! Semantic declaration model consumed by the lowering core.
//!
//! The frontend hands the lowering core a fully resolved, immutable
//! [`SemanticTree`]. Declarations live in one arena and refer to each other by
//! [`SemDeclId`], so recursive generic bounds and self-referencing return
//! types are plain data.

pub mod builder;
pub mod decls;
pub mod ids;
pub mod tree;
pub mod types;

pub use builder::{SemanticTreeBuilder, TreeBuildError, validate};
pub use decls::{
    CallableKind, CallableView, ClassKind, ConstValue, ContainerSource, DeclKind, DeclOrigin,
    Modality, SemAnnotation, SemClass, SemDecl, SemExpr, SemFunction, SemProperty, SemSymbol,
    SemTypeParameter, SemValueParameter,
};
pub use ids::{SemDeclId, TypeParamRef};
pub use tree::SemanticTree;
pub use types::{SemType, SemTypeArg, Variance};
