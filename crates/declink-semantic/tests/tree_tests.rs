use super::*;
use crate::builder::SemanticTreeBuilder;
use crate::decls::{CallableKind, ClassKind};

fn box_tree() -> (SemanticTree, SemDeclId, SemDeclId, SemDeclId) {
    let mut b = SemanticTreeBuilder::new();
    let string = b.class("String", ClassKind::Class);
    let box_ = b.class("Box", ClassKind::Interface);
    let t = b.type_param(box_, "T");
    let get = b.function(box_, "get", SemType::param(t));
    let tree = b.finish().expect("valid tree");
    (tree, string, box_, get)
}

#[test]
fn test_lookup_by_name() {
    let (tree, string, box_, get) = box_tree();
    assert_eq!(tree.find_class("Box"), Some(box_));
    assert_eq!(tree.find_class("String"), Some(string));
    assert_eq!(tree.find_class("Missing"), None);
    assert_eq!(tree.find_member(box_, "get"), Some(get));
    assert_eq!(tree.find_member(string, "get"), None);
}

#[test]
fn test_top_level_excludes_members() {
    let (tree, string, box_, get) = box_tree();
    assert_eq!(tree.top_level(), &[string, box_]);
    assert!(!tree.top_level().contains(&get));
    assert_eq!(tree.classes().collect::<Vec<_>>(), vec![string, box_]);
}

#[test]
fn test_qualified_name_walks_owners() {
    let mut b = SemanticTreeBuilder::new();
    let outer = b.class("Outer", ClassKind::Class);
    let inner = b.nested_class(outer, "Inner", ClassKind::Class);
    let any = b.class("Any", ClassKind::Class);
    let run = b.function(inner, "run", SemType::simple(any));
    let tree = b.finish().expect("valid tree");

    assert_eq!(tree.qualified_name(run), "Outer.Inner.run");
    assert_eq!(tree.qualified_name(outer), "Outer");
    assert_eq!(tree.owner_of(inner), Some(outer));
}

#[test]
fn test_this_type_applies_own_parameters() {
    let (tree, _, box_, _) = box_tree();
    let this = tree.this_type(box_);
    assert_eq!(
        this,
        SemType::class(box_, vec![SemType::param(TypeParamRef::new(box_, 0))])
    );
}

#[test]
fn test_callable_view_for_property_has_no_value_params() {
    let mut b = SemanticTreeBuilder::new();
    let int = b.class("Int", ClassKind::Class);
    let holder = b.class("Holder", ClassKind::Class);
    let size = b.property(holder, "size", SemType::simple(int));
    let tree = b.finish().expect("valid tree");

    let view = tree.callable(size).expect("property is callable");
    assert_eq!(view.kind, CallableKind::Property);
    assert!(view.value_params.is_empty());
    assert_eq!(view.return_type, &SemType::simple(int));
    assert!(tree.callable(holder).is_none());
}

#[test]
fn test_serde_roundtrip_keeps_names_and_ids() {
    let (tree, _, box_, get) = box_tree();
    let json = serde_json::to_string(&tree).expect("serialize");
    let back: SemanticTree = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back.len(), tree.len());
    assert_eq!(back.find_class("Box"), Some(box_));
    assert_eq!(back.decl_name(get), "get");
    assert_eq!(back.decl(get), tree.decl(get));
}
