//! Semantic trees shared by the lowering tests.

use crate::diagnostics::DiagnosticCollector;
use crate::options::LoweringOptions;
use crate::session::LoweringSession;
use declink_semantic::{
    ClassKind, ConstValue, Modality, SemDeclId, SemExpr, SemSymbol, SemType, SemanticTree,
    SemanticTreeBuilder, TypeParamRef,
};
use std::sync::Arc;

pub(crate) fn session_for(tree: SemanticTree) -> (LoweringSession, Arc<DiagnosticCollector>) {
    LoweringSession::with_collector(Arc::new(tree), LoweringOptions::default())
}

/// ```text
/// class Any; class Int; class String
/// interface Box<T> {
///     fun get(): T
///     fun put(value: T, count: Int = 1, copies: Int = count)
///     val size: Int
/// }
/// class StringBox : Box<String>
/// ```
pub(crate) struct BoxFixture {
    pub tree: SemanticTree,
    pub any: SemDeclId,
    pub int: SemDeclId,
    pub string: SemDeclId,
    pub box_: SemDeclId,
    pub t: TypeParamRef,
    pub get: SemDeclId,
    pub put: SemDeclId,
    pub size: SemDeclId,
    pub string_box: SemDeclId,
}

pub(crate) fn box_fixture() -> BoxFixture {
    let mut b = SemanticTreeBuilder::new();
    let any = b.class("Any", ClassKind::Class);
    let int = b.class("Int", ClassKind::Class);
    let string = b.class("String", ClassKind::Class);
    let box_ = b.class("Box", ClassKind::Interface);
    let t = b.type_param(box_, "T");
    let get = b.function(box_, "get", SemType::param(t));
    let put = b.function(box_, "put", SemType::simple(any));
    b.value_param(put, "value", SemType::param(t));
    let count = b.value_param(put, "count", SemType::simple(int));
    b.default_value(put, count, SemExpr::Const(ConstValue::Int(1)));
    let copies = b.value_param(put, "copies", SemType::simple(int));
    b.default_value(
        put,
        copies,
        SemExpr::Ref(SemSymbol::ValueParameter {
            owner: put,
            index: count,
        }),
    );
    let size = b.property(box_, "size", SemType::simple(int));
    let string_box = b.class("StringBox", ClassKind::Class);
    b.extends(string_box, box_, vec![SemType::simple(string)]);
    let tree = b.finish().expect("box fixture is valid");
    BoxFixture {
        tree,
        any,
        int,
        string,
        box_,
        t,
        get,
        put,
        size,
        string_box,
    }
}

/// ```text
/// interface Top { fun m(): Any }
/// interface Left : Top
/// interface Right : Top
/// class Both : Left, Right
/// ```
pub(crate) struct DiamondFixture {
    pub tree: SemanticTree,
    pub top: SemDeclId,
    pub m: SemDeclId,
    pub left: SemDeclId,
    pub right: SemDeclId,
    pub both: SemDeclId,
}

pub(crate) fn diamond_fixture() -> DiamondFixture {
    let mut b = SemanticTreeBuilder::new();
    let any = b.class("Any", ClassKind::Class);
    let top = b.class("Top", ClassKind::Interface);
    let m = b.function(top, "m", SemType::simple(any));
    let left = b.class("Left", ClassKind::Interface);
    b.extends(left, top, Vec::new());
    let right = b.class("Right", ClassKind::Interface);
    b.extends(right, top, Vec::new());
    let both = b.class("Both", ClassKind::Class);
    b.extends(both, left, Vec::new()).extends(both, right, Vec::new());
    let tree = b.finish().expect("diamond fixture is valid");
    DiamondFixture {
        tree,
        top,
        m,
        left,
        right,
        both,
    }
}

/// ```text
/// interface Left  { fun m(): String }
/// interface Right { fun m(): Int }
/// class Both : Left, Right
/// ```
pub(crate) struct ConflictFixture {
    pub tree: SemanticTree,
    pub left_m: SemDeclId,
    pub right_m: SemDeclId,
    pub left: SemDeclId,
    pub right: SemDeclId,
    pub both: SemDeclId,
}

pub(crate) fn conflict_fixture(left_modality: Modality, right_modality: Modality) -> ConflictFixture {
    let mut b = SemanticTreeBuilder::new();
    let string = b.class("String", ClassKind::Class);
    let int = b.class("Int", ClassKind::Class);
    let left = b.class("Left", ClassKind::Interface);
    let left_m = b.function(left, "m", SemType::simple(string));
    b.modality(left_m, left_modality);
    let right = b.class("Right", ClassKind::Interface);
    let right_m = b.function(right, "m", SemType::simple(int));
    b.modality(right_m, right_modality);
    let both = b.class("Both", ClassKind::Class);
    b.extends(both, left, Vec::new()).extends(both, right, Vec::new());
    let tree = b.finish().expect("conflict fixture is valid");
    ConflictFixture {
        tree,
        left_m,
        right_m,
        left,
        right,
        both,
    }
}
