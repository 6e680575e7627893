use super::*;
use crate::fixtures::{box_fixture, session_for};
use crate::types::LinkTypeArg;
use declink_semantic::{ClassKind, SemAnnotation, SemType, SemanticTreeBuilder, Variance};

#[test]
fn test_rename_is_unsupported() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let node = session.resolve(fx.get, None).expect("resolve");

    assert_eq!(
        node.set_name(Atom::NONE),
        Err(LoweringError::UnsupportedOperation {
            decl: node.id(),
            operation: "rename",
        })
    );
}

#[test]
fn test_fields_are_computed_on_first_read_only() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let node = session.resolve(fx.get, None).expect("resolve");

    assert!(!node.is_evaluated("returnType"));
    assert!(!node.is_evaluated("valueParameters"));

    let first = node.return_type(&session).expect("return type") as *const LinkType;
    assert!(node.is_evaluated("returnType"));
    assert!(!node.is_evaluated("valueParameters"));

    let second = node.return_type(&session).expect("return type") as *const LinkType;
    assert_eq!(first, second);
    assert!(!node.is_evaluated("no such field"));
}

#[test]
fn test_member_return_type_refers_to_owner_parameter() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let box_node = session.resolve(fx.box_, None).expect("resolve");
    let get = session.resolve(fx.get, None).expect("resolve");

    assert_eq!(
        get.return_type(&session).expect("return type"),
        &LinkType::TypeParameter {
            param: box_node.type_parameters()[0],
            nullable: false,
        }
    );
}

#[test]
fn test_dispatch_receiver_follows_class_this() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let box_node = session.resolve(fx.box_, None).expect("resolve");
    let get = session.resolve(fx.get, None).expect("resolve");

    let dispatch = get
        .dispatch_receiver_parameter(&session)
        .expect("dispatch")
        .expect("member has a dispatch receiver");
    assert_eq!(dispatch.kind, ParameterKind::DispatchReceiver);
    assert_eq!(
        dispatch.ty,
        LinkType::Class {
            class: box_node.id(),
            args: vec![LinkTypeArg::Type {
                variance: Variance::Invariant,
                ty: LinkType::TypeParameter {
                    param: box_node.type_parameters()[0],
                    nullable: false,
                },
            }],
            nullable: false,
        }
    );
    assert!(box_node.is_evaluated("thisReceiver"));
}

#[test]
fn test_static_and_top_level_callables_have_no_dispatch_receiver() {
    let mut b = SemanticTreeBuilder::new();
    let int = b.class("Int", ClassKind::Class);
    let utils = b.class("Utils", ClassKind::StaticContainer);
    let helper = b.function(utils, "helper", SemType::simple(int));
    b.set_static(helper);
    let counter = b.property(utils, "counter", SemType::simple(int));
    let top = b.top_level_function("top", SemType::simple(int));
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    for decl in [helper, top] {
        let node = session.resolve(decl, None).expect("resolve");
        assert_eq!(node.dispatch_receiver_parameter(&session), Ok(None));
    }
    // Non-static members of a static container still see no `this`.
    let counter = session.resolve(counter, None).expect("resolve");
    assert_eq!(counter.dispatch_receiver_parameter(&session), Ok(None));
    let utils = session.resolve(utils, None).expect("resolve");
    assert_eq!(utils.this_receiver(&session), Ok(None));
}

#[test]
fn test_context_receivers_lead_value_parameters() {
    // context(Logger) fun String.shout(times: Int): String
    let mut b = SemanticTreeBuilder::new();
    let int = b.class("Int", ClassKind::Class);
    let string = b.class("String", ClassKind::Class);
    let logger = b.class("Logger", ClassKind::Interface);
    let shout = b.top_level_function("shout", SemType::simple(string));
    b.receiver(shout, SemType::simple(string))
        .context_receiver(shout, SemType::simple(logger));
    b.value_param(shout, "times", SemType::simple(int));
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let node = session.resolve(shout, None).expect("resolve");
    assert_eq!(node.context_receiver_count(), 1);

    let params = node.value_parameters(&session).expect("params");
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].kind, ParameterKind::Context);
    assert_eq!(session.tree().name(params[0].name), "<context>");
    assert_eq!(params[0].ty.class_id(), Some(session.resolve(logger, None).expect("resolve").id()));
    assert_eq!(params[1].kind, ParameterKind::Regular);
    assert_eq!(session.tree().name(params[1].name), "times");

    let extension = node
        .extension_receiver_parameter(&session)
        .expect("extension")
        .expect("has extension receiver");
    assert_eq!(extension.kind, ParameterKind::ExtensionReceiver);
    assert_eq!(extension.ty.class_id(), Some(session.resolve(string, None).expect("resolve").id()));
}

#[test]
fn test_defaults_bind_to_earlier_parameters() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let put = session.resolve(fx.put, None).expect("resolve");

    let params = put.value_parameters(&session).expect("params");
    assert_eq!(params.len(), 3);
    assert_eq!(params[0].default, None);
    assert_eq!(params[1].default, Some(LinkExpr::Const(ConstValue::Int(1))));
    assert_eq!(
        params[2].default,
        Some(LinkExpr::ValueParameter {
            owner: put.id(),
            index: 1,
        })
    );
    assert_eq!(session.storage().scope_depth(), 0);
}

#[test]
fn test_forward_reference_in_default_is_unbound() {
    // fun f(a: Int = b, b: Int)
    let mut b = SemanticTreeBuilder::new();
    let int = b.class("Int", ClassKind::Class);
    let f = b.top_level_function("f", SemType::simple(int));
    let first = b.value_param(f, "a", SemType::simple(int));
    let second = b.value_param(f, "b", SemType::simple(int));
    b.default_value(
        f,
        first,
        declink_semantic::SemExpr::Ref(declink_semantic::SemSymbol::ValueParameter {
            owner: f,
            index: second,
        }),
    );
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let node = session.resolve(f, None).expect("resolve");
    assert_eq!(
        node.value_parameters(&session),
        Err(LoweringError::UnboundValueParameter { owner: f, index: 1 })
    );
    assert!(!node.is_evaluated("valueParameters"));
    assert_eq!(session.storage().scope_depth(), 0);
}

#[test]
fn test_initial_signature_skips_self() {
    let mut b = SemanticTreeBuilder::new();
    let int = b.class("Int", ClassKind::Class);
    let original = b.top_level_function("original", SemType::simple(int));
    let bridge = b.top_level_function("bridge", SemType::simple(int));
    b.initial_signature(bridge, original).initial_signature(original, original);
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let original_node = session.resolve(original, None).expect("resolve");
    let bridge_node = session.resolve(bridge, None).expect("resolve");
    assert_eq!(bridge_node.initial_signature(&session), Ok(Some(original_node.id())));
    assert_eq!(original_node.initial_signature(&session), Ok(None));
}

#[test]
fn test_annotations_resolve_their_classes() {
    let mut b = SemanticTreeBuilder::new();
    let deprecated = b.class("Deprecated", ClassKind::Class);
    let int = b.class("Int", ClassKind::Class);
    let old = b.top_level_property("old", SemType::simple(int));
    let message = b.intern("message");
    b.annotate(
        old,
        SemAnnotation {
            class: deprecated,
            args: vec![(message, ConstValue::String("use new".into()))],
        },
    );
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let node = session.resolve(old, None).expect("resolve");
    let annotations = node.annotations(&session).expect("annotations");
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].class, session.resolve(deprecated, None).expect("resolve").id());
    assert_eq!(annotations[0].args, vec![(message, ConstValue::String("use new".into()))]);
}

#[test]
fn test_class_fields_follow_declaration_order() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let string_box = session.resolve(fx.string_box, None).expect("resolve");
    let box_node = session.resolve(fx.box_, None).expect("resolve");

    let supertypes = string_box.supertypes(&session).expect("supertypes");
    assert_eq!(supertypes.len(), 1);
    assert_eq!(supertypes[0].class_id(), Some(box_node.id()));

    let members: Vec<_> = box_node
        .declared_members(&session)
        .expect("members")
        .iter()
        .map(|&id| session.decl(id).expect("decl").semantic())
        .collect();
    assert_eq!(members, vec![fx.get, fx.put, fx.size]);
}

#[test]
fn test_wrong_kind_fields_are_unsupported() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let box_node = session.resolve(fx.box_, None).expect("resolve");
    let size = session.resolve(fx.size, None).expect("resolve");

    assert!(matches!(
        box_node.return_type(&session),
        Err(LoweringError::UnsupportedOperation {
            operation: "returnType",
            ..
        })
    ));
    assert!(matches!(
        size.supertypes(&session),
        Err(LoweringError::UnsupportedOperation {
            operation: "superTypes",
            ..
        })
    ));
    assert!(matches!(
        size.initial_signature(&session),
        Err(LoweringError::UnsupportedOperation {
            operation: "initialSignature",
            ..
        })
    ));
}

#[test]
fn test_property_type_is_its_return_type() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);
    let int = session.resolve(fx.int, None).expect("resolve").id();
    let size = session.resolve(fx.size, None).expect("resolve");

    assert_eq!(size.kind(), LinkDeclKind::Property);
    assert_eq!(size.return_type(&session).expect("type").class_id(), Some(int));
    assert!(size.value_parameters(&session).expect("params").is_empty());
}
