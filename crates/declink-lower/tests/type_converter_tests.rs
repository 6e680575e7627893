use super::*;
use crate::error::LoweringError;
use crate::fixtures::{box_fixture, session_for};
use declink_semantic::{ClassKind, SemanticTreeBuilder, Variance};
use rustc_hash::FxHashMap;
use std::cell::Cell;

/// Resolver with fixed tables; counts lookups.
struct TableResolver {
    classes: FxHashMap<SemDeclId, LinkDeclId>,
    params: FxHashMap<TypeParamRef, TypeParameterId>,
    lookups: Cell<usize>,
}

impl ClassifierResolver for TableResolver {
    fn class_symbol(&self, class: SemDeclId) -> LoweringResult<LinkDeclId> {
        self.lookups.set(self.lookups.get() + 1);
        self.classes
            .get(&class)
            .copied()
            .ok_or(LoweringError::UnknownDeclaration(class))
    }

    fn type_parameter_symbol(&self, param: TypeParamRef) -> LoweringResult<TypeParameterId> {
        self.lookups.set(self.lookups.get() + 1);
        self.params
            .get(&param)
            .copied()
            .ok_or(LoweringError::ClassifierNotRegistered { decl: param.owner })
    }
}

#[test]
fn test_converts_nested_arguments_structurally() {
    let fx = box_fixture();
    let resolver = TableResolver {
        classes: [(fx.box_, LinkDeclId(10)), (fx.string, LinkDeclId(11))].into_iter().collect(),
        params: FxHashMap::default(),
        lookups: Cell::new(0),
    };
    let converter = TypeConverter::new(&resolver);

    let nested = SemType::class_with(
        fx.box_,
        vec![SemTypeArg::out(SemType::class(fx.box_, vec![SemType::simple(fx.string).nullable()]))],
    );
    let converted = converter.convert(&nested).expect("convert");

    assert_eq!(
        converted,
        LinkType::Class {
            class: LinkDeclId(10),
            args: vec![LinkTypeArg::Type {
                variance: Variance::Out,
                ty: LinkType::Class {
                    class: LinkDeclId(10),
                    args: vec![LinkTypeArg::Type {
                        variance: Variance::Invariant,
                        ty: LinkType::Class {
                            class: LinkDeclId(11),
                            args: Vec::new(),
                            nullable: true,
                        },
                    }],
                    nullable: false,
                },
            }],
            nullable: false,
        }
    );
    assert_eq!(resolver.lookups.get(), 3);
}

#[test]
fn test_unregistered_parameter_is_an_error() {
    let fx = box_fixture();
    let resolver = TableResolver {
        classes: FxHashMap::default(),
        params: FxHashMap::default(),
        lookups: Cell::new(0),
    };
    let converter = TypeConverter::new(&resolver);

    assert_eq!(
        converter.convert(&SemType::param(fx.t)),
        Err(LoweringError::ClassifierNotRegistered { decl: fx.box_ })
    );
    assert_eq!(converter.convert(&SemType::Error), Ok(LinkType::Error));
}

#[test]
fn test_self_referential_bound_converts_without_expansion() {
    // fun <T : Comparable<T>> max(a: T): T
    let mut b = SemanticTreeBuilder::new();
    let comparable = b.class("Comparable", ClassKind::Interface);
    b.type_param(comparable, "T");
    let max = b.top_level_function("max", SemType::Error);
    let t = b.type_param(max, "T");
    b.bound(t, SemType::class(comparable, vec![SemType::param(t)]));
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let node = session.resolve(max, None).expect("resolve");
    let param = node.type_parameters()[0];
    let converted = session.converter().convert(&SemType::param(t)).expect("convert");
    assert_eq!(
        converted,
        LinkType::TypeParameter {
            param,
            nullable: false,
        }
    );

    let comparable_id = session.resolve(comparable, None).expect("resolve").id();
    let bounds = session.type_parameter_bounds(param).expect("bounds");
    assert_eq!(
        &*bounds,
        &[LinkType::Class {
            class: comparable_id,
            args: vec![LinkTypeArg::Type {
                variance: Variance::Invariant,
                ty: LinkType::TypeParameter {
                    param,
                    nullable: false,
                },
            }],
            nullable: false,
        }]
    );
}

#[test]
fn test_deeply_nested_type_converts() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree.clone());
    let mut ty = SemType::simple(fx.string);
    for _ in 0..2_000 {
        ty = SemType::class(fx.box_, vec![ty]);
    }

    let converted = session.converter().convert(&ty).expect("convert");
    let mut depth = 0;
    let mut current = &converted;
    while let Some(inner) = current.args().first().and_then(LinkTypeArg::ty) {
        depth += 1;
        current = inner;
    }
    assert_eq!(depth, 2_000);
}
