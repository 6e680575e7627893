use super::*;
use crate::fixtures::box_fixture;

#[test]
fn test_lookup_before_registration_fails() {
    let fx = box_fixture();
    let cache = ClassifierCache::new();

    assert_eq!(
        cache.lookup(fx.box_, 0),
        Err(LoweringError::ClassifierNotRegistered { decl: fx.box_ })
    );
    assert!(!cache.is_registered(fx.box_));
}

#[test]
fn test_register_is_idempotent() {
    let fx = box_fixture();
    let cache = ClassifierCache::new();

    let first = cache.register(&fx.tree, fx.box_).expect("register");
    let second = cache.register(&fx.tree, fx.box_).expect("register again");
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(cache.registration_count(), 1);
    assert_eq!(cache.lookup(fx.box_, 0), Ok(first[0]));
}

#[test]
fn test_declarations_without_parameters_still_register() {
    let fx = box_fixture();
    let cache = ClassifierCache::new();

    let params = cache.register(&fx.tree, fx.string_box).expect("register");
    assert!(params.is_empty());
    assert!(cache.is_registered(fx.string_box));
    assert_eq!(
        cache.lookup(fx.string_box, 0),
        Err(LoweringError::UnknownTypeParameter(TypeParamRef::new(fx.string_box, 0)))
    );
}

#[test]
fn test_info_records_origin_and_name() {
    let fx = box_fixture();
    let cache = ClassifierCache::new();
    let params = cache.register(&fx.tree, fx.box_).expect("register");

    let info = cache.info(params[0]).expect("info");
    assert_eq!(info.origin, fx.t);
    assert_eq!(fx.tree.name(info.name), "T");
    assert!(!info.reified);
}

#[test]
fn test_unknown_declaration_is_rejected() {
    let fx = box_fixture();
    let cache = ClassifierCache::new();
    let missing = SemDeclId(10_000);

    assert_eq!(
        cache.register(&fx.tree, missing),
        Err(LoweringError::UnknownDeclaration(missing))
    );
    assert!(cache.is_empty());
}
