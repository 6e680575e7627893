//! Semantic type → link-time type.
//!
//! Conversion is structural: class references become references to the
//! class's linkable declaration, type parameter references become classifier
//! cache identities. Bounds are never followed, so recursive bounds such as
//! `T : Comparable<T>` terminate; [`LoweringSession::type_parameter_bounds`]
//! expands them on explicit request.
//!
//! [`LoweringSession::type_parameter_bounds`]: crate::LoweringSession::type_parameter_bounds

use crate::error::LoweringResult;
use crate::ids::{LinkDeclId, TypeParameterId};
use crate::types::{LinkType, LinkTypeArg};
use declink_common::limits;
use declink_semantic::{SemDeclId, SemType, SemTypeArg, TypeParamRef};

/// Resolves the identities a converted type refers to.
pub trait ClassifierResolver {
    fn class_symbol(&self, class: SemDeclId) -> LoweringResult<LinkDeclId>;
    fn type_parameter_symbol(&self, param: TypeParamRef) -> LoweringResult<TypeParameterId>;
}

pub struct TypeConverter<'a, R: ClassifierResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: ClassifierResolver + ?Sized> TypeConverter<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    pub fn convert(&self, ty: &SemType) -> LoweringResult<LinkType> {
        stacker::maybe_grow(limits::STACK_RED_ZONE, limits::STACK_GROWTH_SIZE, || {
            self.convert_inner(ty)
        })
    }

    fn convert_inner(&self, ty: &SemType) -> LoweringResult<LinkType> {
        Ok(match ty {
            SemType::Class {
                class,
                args,
                nullable,
            } => LinkType::Class {
                class: self.resolver.class_symbol(*class)?,
                args: args
                    .iter()
                    .map(|arg| self.convert_arg(arg))
                    .collect::<LoweringResult<_>>()?,
                nullable: *nullable,
            },
            SemType::TypeParameter { param, nullable } => LinkType::TypeParameter {
                param: self.resolver.type_parameter_symbol(*param)?,
                nullable: *nullable,
            },
            SemType::Error => LinkType::Error,
        })
    }

    pub fn convert_arg(&self, arg: &SemTypeArg) -> LoweringResult<LinkTypeArg> {
        Ok(match arg {
            SemTypeArg::Star => LinkTypeArg::Star,
            SemTypeArg::Type { variance, ty } => LinkTypeArg::Type {
                variance: *variance,
                ty: self.convert(ty)?,
            },
        })
    }
}

#[cfg(test)]
#[path = "../tests/type_converter_tests.rs"]
mod tests;
