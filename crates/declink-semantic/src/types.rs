//! Resolved semantic type references.

use crate::ids::{SemDeclId, TypeParamRef};
use serde::{Deserialize, Serialize};

/// Use-site variance of a type argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variance {
    #[default]
    Invariant,
    In,
    Out,
}

/// A type argument: either a star projection or a projected type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemTypeArg {
    Star,
    Type { variance: Variance, ty: SemType },
}

impl SemTypeArg {
    pub fn invariant(ty: SemType) -> Self {
        SemTypeArg::Type {
            variance: Variance::Invariant,
            ty,
        }
    }

    pub fn out(ty: SemType) -> Self {
        SemTypeArg::Type {
            variance: Variance::Out,
            ty,
        }
    }

    pub fn contravariant(ty: SemType) -> Self {
        SemTypeArg::Type {
            variance: Variance::In,
            ty,
        }
    }

    pub fn ty(&self) -> Option<&SemType> {
        match self {
            SemTypeArg::Star => None,
            SemTypeArg::Type { ty, .. } => Some(ty),
        }
    }
}

/// A fully resolved type reference as produced by the frontend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemType {
    Class {
        class: SemDeclId,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<SemTypeArg>,
        #[serde(default)]
        nullable: bool,
    },
    TypeParameter {
        param: TypeParamRef,
        #[serde(default)]
        nullable: bool,
    },
    /// Placeholder left by the frontend for an unresolvable reference.
    Error,
}

impl SemType {
    /// `class<args...>` with invariant arguments.
    pub fn class(class: SemDeclId, args: Vec<SemType>) -> Self {
        SemType::Class {
            class,
            args: args.into_iter().map(SemTypeArg::invariant).collect(),
            nullable: false,
        }
    }

    pub fn class_with(class: SemDeclId, args: Vec<SemTypeArg>) -> Self {
        SemType::Class {
            class,
            args,
            nullable: false,
        }
    }

    pub fn simple(class: SemDeclId) -> Self {
        Self::class(class, Vec::new())
    }

    pub fn param(param: TypeParamRef) -> Self {
        SemType::TypeParameter {
            param,
            nullable: false,
        }
    }

    /// The same type marked nullable.
    pub fn nullable(self) -> Self {
        self.with_nullability(true)
    }

    pub fn with_nullability(self, nullable: bool) -> Self {
        match self {
            SemType::Class { class, args, .. } => SemType::Class {
                class,
                args,
                nullable,
            },
            SemType::TypeParameter { param, .. } => SemType::TypeParameter { param, nullable },
            SemType::Error => SemType::Error,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            SemType::Class { nullable, .. } | SemType::TypeParameter { nullable, .. } => *nullable,
            SemType::Error => false,
        }
    }

    pub fn class_id(&self) -> Option<SemDeclId> {
        match self {
            SemType::Class { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn type_parameter(&self) -> Option<TypeParamRef> {
        match self {
            SemType::TypeParameter { param, .. } => Some(*param),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SemType::Error)
    }
}
