//! Link-time type representation.
//!
//! Mirrors [`SemType`](declink_semantic::SemType) but refers to classes by
//! their linkable declaration and to type parameters by their classifier
//! cache identity.

use crate::ids::{LinkDeclId, TypeParameterId};
use declink_semantic::Variance;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkTypeArg {
    Star,
    Type { variance: Variance, ty: LinkType },
}

impl LinkTypeArg {
    pub fn ty(&self) -> Option<&LinkType> {
        match self {
            LinkTypeArg::Star => None,
            LinkTypeArg::Type { ty, .. } => Some(ty),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    Class {
        class: LinkDeclId,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<LinkTypeArg>,
        #[serde(default)]
        nullable: bool,
    },
    TypeParameter {
        param: TypeParameterId,
        #[serde(default)]
        nullable: bool,
    },
    Error,
}

impl LinkType {
    pub fn class_id(&self) -> Option<LinkDeclId> {
        match self {
            LinkType::Class { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn type_parameter(&self) -> Option<TypeParameterId> {
        match self {
            LinkType::TypeParameter { param, .. } => Some(*param),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            LinkType::Class { nullable, .. } | LinkType::TypeParameter { nullable, .. } => *nullable,
            LinkType::Error => false,
        }
    }

    pub fn args(&self) -> &[LinkTypeArg] {
        match self {
            LinkType::Class { args, .. } => args,
            _ => &[],
        }
    }
}
