use super::*;
use crate::fixtures::{box_fixture, session_for};
use declink_semantic::{ClassKind, SemType, SemanticTreeBuilder};

fn only(classes: &[&str]) -> DumpFilter {
    DumpFilter {
        classes: classes.iter().map(|c| c.to_string()).collect(),
        skip_fake_overrides: false,
    }
}

#[test]
fn test_text_dump_of_generic_interface_and_subclass() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    let dumps = dump_tree(&session, &only(&["Box", "StringBox"])).expect("dump");
    let text = render_text(&dumps);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines,
        vec![
            "abstract class Box<T> {",
            "  abstract fun [Box<T>] get(): T",
            "  abstract fun [Box<T>] put(value: T, count: Int = 1, copies: Int = count): Any",
            "  abstract val [Box<T>] size: Int",
            "}",
            "class StringBox : Box<String> {",
            "  /* fake override */ abstract fun [StringBox] get(): String overrides Box.get",
            "  /* fake override */ abstract fun [StringBox] put(value: String, count: Int, copies: Int): Any overrides Box.put",
            "  /* fake override */ abstract val [StringBox] size: Int overrides Box.size",
            "}",
        ]
    );
}

#[test]
fn test_dump_without_filter_covers_every_top_level_declaration() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    let names: Vec<_> = dump_tree(&session, &DumpFilter::default())
        .expect("dump")
        .into_iter()
        .map(|d| d.qualified_name)
        .collect();
    assert_eq!(names, vec!["Any", "Int", "String", "Box", "StringBox"]);

    assert!(dump_tree(&session, &only(&["Missing"])).expect("dump").is_empty());
}

#[test]
fn test_json_dump_uses_camel_case_fields() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    let dumps = dump_tree(&session, &only(&["StringBox"])).expect("dump");
    let json = render_json(&dumps).expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    let class = &value[0];
    assert_eq!(class["qualifiedName"], "StringBox");
    assert_eq!(class["kind"], "class");
    assert_eq!(class["supertypes"][0], "Box<String>");

    let get = &class["members"][0];
    assert_eq!(get["origin"], "fakeOverride");
    assert_eq!(get["qualifiedName"], "StringBox.get");
    assert_eq!(get["returnType"], "String");
    assert_eq!(get["overridden"][0], "Box.get");
    assert!(get.get("valueParameters").is_none());

    let put = &class["members"][1];
    assert_eq!(put["valueParameters"][0]["type"], "String");
    assert_eq!(put["valueParameters"][0]["kind"], "regular");
    assert!(put["valueParameters"][1].get("default").is_none());
}

#[test]
fn test_text_dump_of_extension_with_context_and_provenance() {
    let mut b = SemanticTreeBuilder::new();
    let int = b.class("Int", ClassKind::Class);
    let string = b.class("String", ClassKind::Class);
    let logger = b.class("Logger", ClassKind::Interface);
    let list = b.class("List", ClassKind::Interface);
    b.type_param(list, "E");
    let shout = b.top_level_function("shout", SemType::class(list, vec![SemType::simple(string)]));
    let t = b.type_param(shout, "T");
    b.receiver(shout, SemType::param(t).nullable())
        .context_receiver(shout, SemType::simple(logger))
        .container_source(shout, "text", Some("ShoutKt"));
    let parts = b.value_param(shout, "parts", SemType::simple(int));
    b.vararg(shout, parts);
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let dump = dump_semantic(&session, shout, &DumpFilter::default()).expect("dump");
    assert_eq!(
        render_text(&[dump]),
        "fun <T> context(Logger) T?.shout(vararg parts: Int): List<String> in text/ShoutKt\n"
    );
}

#[test]
fn test_display_name_of_nested_class_and_member() {
    let mut b = SemanticTreeBuilder::new();
    let int = b.class("Int", ClassKind::Class);
    let outer = b.class("Outer", ClassKind::Class);
    let inner = b.nested_class(outer, "Inner", ClassKind::Class);
    let count = b.property(inner, "count", SemType::simple(int));
    let tree = b.finish().expect("valid tree");
    let (session, _) = session_for(tree);

    let inner_node = session.resolve(inner, None).expect("resolve");
    let count_node = session.resolve(count, None).expect("resolve");
    assert_eq!(display_name(&session, &inner_node), "Outer.Inner");
    assert_eq!(display_name(&session, &count_node), "Outer.Inner.count");
}

#[test]
fn test_dump_forces_every_field() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    dump_tree(&session, &DumpFilter::default()).expect("dump");
    let put = session.resolve(fx.put, None).expect("resolve");
    for field in [
        "returnType",
        "dispatchReceiverParameter",
        "extensionReceiverParameter",
        "valueParameters",
        "overriddenSymbols",
        "initialSignature",
        "annotations",
    ] {
        assert!(put.is_evaluated(field), "{field} was not evaluated");
    }
}

#[test]
fn test_fake_overrides_can_be_left_out() {
    let fx = box_fixture();
    let (session, _) = session_for(fx.tree);

    let filter = DumpFilter {
        classes: vec!["StringBox".to_string()],
        skip_fake_overrides: true,
    };
    let dumps = dump_tree(&session, &filter).expect("dump");
    assert_eq!(render_text(&dumps), "class StringBox : Box<String>\n");
    assert!(session.storage().lookup(fx.get, Some(fx.string_box)).is_none());
}
