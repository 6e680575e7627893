use super::*;
use crate::fixtures::{box_fixture, conflict_fixture, diamond_fixture, session_for};
use declink_semantic::{ClassKind, Modality, SemType, SemanticTreeBuilder};
use rayon::prelude::*;
use std::sync::Barrier;
use std::thread;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

#[test]
fn test_concurrent_resolve_constructs_one_instance() {
    init_tracing();
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    const THREADS: usize = 8;
    let barrier = Barrier::new(THREADS);

    let nodes: Vec<Arc<LinkDecl>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let node = session.resolve(fx.get, Some(fx.string_box)).expect("resolve");
                    node.return_type(&session).expect("return type");
                    node
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect()
    });

    assert!(nodes.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(session.storage().constructed_count(), session.storage().len());
    assert_eq!(session.classifiers().registration_count(), session.classifiers().len());
}

#[test]
fn test_concurrent_field_reads_agree() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let put = session.resolve(fx.put, Some(fx.string_box)).expect("resolve");
    const THREADS: usize = 8;
    let barrier = Barrier::new(THREADS);

    let addresses: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let params = put.value_parameters(&session).expect("params");
                    params.as_ptr() as usize
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect()
    });

    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(session.storage().scope_depth(), 0);
}

#[test]
fn test_parallel_lowering_of_every_class() {
    let fx = diamond_fixture();
    let (session, diagnostics) = session_for(fx.tree);
    let classes: Vec<_> = session.tree().classes().collect();

    let lowered: Vec<usize> = classes
        .par_iter()
        .map(|&class| session.members_of(class).expect("members").len())
        .collect();

    // Any, Top, Left, Right, Both
    assert_eq!(lowered, vec![0, 1, 1, 1, 1]);
    assert!(diagnostics.is_empty());
    assert_eq!(session.storage().constructed_count(), session.storage().len());
}

#[test]
fn test_parallel_conflict_reports_once() {
    let fx = conflict_fixture(Modality::Abstract, Modality::Abstract);
    let (session, diagnostics) = session_for(fx.tree);

    let chosen: Vec<_> = (0..16)
        .into_par_iter()
        .map(|_| session.overrides_of(fx.both).expect("overrides").to_vec())
        .collect();

    assert!(chosen.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_members_of_lists_declared_then_fake() {
    let mut b = SemanticTreeBuilder::new();
    let any = b.class("Any", ClassKind::Class);
    let base = b.class("Base", ClassKind::Interface);
    let base_m = b.function(base, "m", SemType::simple(any));
    let derived = b.class("Derived", ClassKind::Class);
    b.extends(derived, base, Vec::new());
    let nested = b.nested_class(derived, "Nested", ClassKind::Class);
    let own = b.property(derived, "own", SemType::simple(any));
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let members: Vec<_> = session
        .members_of(derived)
        .expect("members")
        .into_iter()
        .map(|id| {
            let node = session.decl(id).expect("decl");
            (node.semantic(), node.is_fake_override())
        })
        .collect();
    assert_eq!(members, vec![(nested, false), (own, false), (base_m, true)]);
}

#[test]
fn test_resolve_only_constructs() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    let node = session.resolve(fx.string_box, None).expect("resolve");
    assert_eq!(session.storage().len(), 1);
    assert!(!node.is_evaluated("superTypes"));
    assert!(session.decl(node.id()).is_ok_and(|found| Arc::ptr_eq(&found, &node)));
}

#[test]
fn test_type_parameter_info_and_bounds() {
    let mut b = SemanticTreeBuilder::new();
    let comparable = b.class("Comparable", ClassKind::Interface);
    b.type_param(comparable, "T");
    let sorted = b.class("Sorted", ClassKind::Class);
    let e = b.type_param(sorted, "E");
    b.bound(e, SemType::class(comparable, vec![SemType::param(e)]));
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let node = session.resolve(sorted, None).expect("resolve");
    let id = node.type_parameters()[0];
    let info = session.type_parameter(id).expect("registered");
    assert_eq!(info.origin, e);
    assert_eq!(session.tree().name(info.name), "E");

    let first = session.type_parameter_bounds(id).expect("bounds");
    let second = session.type_parameter_bounds(id).expect("bounds");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 1);

    assert_eq!(
        session.type_parameter_bounds(TypeParameterId(9_999)).unwrap_err(),
        LoweringError::UnknownTypeParameterId(TypeParameterId(9_999))
    );
}

#[test]
fn test_type_parameter_symbol_registers_owner_on_demand() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    assert!(!session.classifiers().is_registered(fx.box_));
    let id = session.type_parameter_symbol(fx.t).expect("symbol");
    assert!(session.classifiers().is_registered(fx.box_));
    assert_eq!(session.resolve(fx.box_, None).expect("resolve").type_parameters(), &[id]);
}

#[test]
fn test_class_symbol_rejects_members() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    assert_eq!(session.class_symbol(fx.get), Err(LoweringError::NotAClass(fx.get)));
}
