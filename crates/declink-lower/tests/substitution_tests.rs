use super::*;
use crate::fixtures::box_fixture;
use declink_semantic::{ClassKind, SemanticTreeBuilder};

#[test]
fn test_supertype_argument_replaces_parameter() {
    let fx = box_fixture();
    let subst = supertype_substitution(&fx.tree, fx.string_box, fx.box_, 8).expect("reachable");

    assert_eq!(subst.apply(&fx.tree, &SemType::param(fx.t)), SemType::simple(fx.string));
    assert_eq!(
        subst.apply(&fx.tree, &SemType::param(fx.t).nullable()),
        SemType::simple(fx.string).nullable()
    );
}

#[test]
fn test_identity_for_same_class_and_none_for_unrelated() {
    let fx = box_fixture();
    assert!(
        supertype_substitution(&fx.tree, fx.box_, fx.box_, 8)
            .expect("self")
            .is_identity()
    );
    assert!(supertype_substitution(&fx.tree, fx.string, fx.box_, 8).is_none());
}

#[test]
fn test_substitution_composes_along_path() {
    // interface Box<T>; interface ListBox<E> : Box<List<E>>; class Names : ListBox<String>
    let mut b = SemanticTreeBuilder::new();
    let string = b.class("String", ClassKind::Class);
    let list = b.class("List", ClassKind::Interface);
    b.type_param(list, "E");
    let box_ = b.class("Box", ClassKind::Interface);
    let t = b.type_param(box_, "T");
    let list_box = b.class("ListBox", ClassKind::Interface);
    let e = b.type_param(list_box, "E");
    b.extends(list_box, box_, vec![SemType::class(list, vec![SemType::param(e)])]);
    let names = b.class("Names", ClassKind::Class);
    b.extends(names, list_box, vec![SemType::simple(string)]);
    let tree = b.finish().expect("valid tree");

    let subst = supertype_substitution(&tree, names, box_, 8).expect("reachable");
    assert_eq!(
        subst.apply(&tree, &SemType::param(t)),
        SemType::class(list, vec![SemType::simple(string)])
    );
}

#[test]
fn test_projection_is_carried_into_bare_argument() {
    let fx = box_fixture();
    let mut subst = Substitution::identity();
    subst.insert(fx.t, SemTypeArg::out(SemType::simple(fx.string)));

    let boxed = SemType::class(fx.box_, vec![SemType::param(fx.t)]);
    assert_eq!(
        subst.apply(&fx.tree, &boxed),
        SemType::class_with(fx.box_, vec![SemTypeArg::out(SemType::simple(fx.string))])
    );
}

#[test]
fn test_star_reads_as_nullable_any() {
    let fx = box_fixture();
    let mut subst = Substitution::identity();
    subst.insert(fx.t, SemTypeArg::Star);

    assert_eq!(
        subst.apply(&fx.tree, &SemType::param(fx.t)),
        SemType::simple(fx.any).nullable()
    );
}

#[test]
fn test_first_path_wins_in_declaration_order() {
    // interface Box<T>; interface A : Box<String>; interface B : Box<Int>; class C : A, B
    let mut b = SemanticTreeBuilder::new();
    let string = b.class("String", ClassKind::Class);
    let int = b.class("Int", ClassKind::Class);
    let box_ = b.class("Box", ClassKind::Interface);
    let t = b.type_param(box_, "T");
    let a = b.class("A", ClassKind::Interface);
    b.extends(a, box_, vec![SemType::simple(string)]);
    let bb = b.class("B", ClassKind::Interface);
    b.extends(bb, box_, vec![SemType::simple(int)]);
    let c = b.class("C", ClassKind::Class);
    b.extends(c, a, Vec::new()).extends(c, bb, Vec::new());
    let tree = b.finish().expect("valid tree");

    let subst = supertype_substitution(&tree, c, box_, 8).expect("reachable");
    assert_eq!(subst.apply(&tree, &SemType::param(t)), SemType::simple(string));
}
