pub mod fixtures;

use envspec::prelude::*;
use envspec::schema::RangeBound;
use envspec::{Attention, SchemaError, default_registry};
use fixtures::*;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn test_numeric_above_maximum_cites_the_bound() {
    let (_, registry) = setup(&[("LEVEL", "25")]);
    let level = declare(
        &registry,
        SpecBuilder::new("LEVEL", "Verbosity", NumericSchema::<i16>::new().min(-10).max(20)),
    );

    let err = level.error().expect("25 is out of range");
    assert!(
        matches!(
            &err,
            ValueError::Schema { source: SchemaError::Range { bound: RangeBound::Above, limit }, .. }
                if limit == "20"
        ),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains("20"));
    assert_eq!(level.availability(), Availability::Explicit);
}

#[test]
fn test_set_membership_lists_every_member_in_order() {
    let (_, registry) = setup(&[("COLOR", "purple")]);
    let color = declare(&registry, SpecBuilder::new("COLOR", "Theme color", color_schema()));

    let Some(ValueError::Schema { source: SchemaError::Membership { accepted, .. }, .. }) =
        color.error()
    else {
        panic!("Expected a membership error");
    };
    assert_eq!(accepted, ["red", "green", "blue"]);
    assert!(
        color.error().unwrap().to_string().contains(r#"must be one of "red", "green" or "blue""#)
    );
}

#[test]
fn test_default_violating_its_schema_fails_at_build_time() {
    let result = SpecBuilder::new(
        "KEY",
        "Signing key",
        BinarySchema::<Vec<u8>>::new(BinaryEncoding::Base64).min_len(5),
    )
    .default_value(vec![1, 2, 3])
    .build();

    assert!(matches!(result, Err(ConfigError::InvalidDefault { .. })));
}

#[test]
fn test_composite_fills_missing_part_from_its_default() {
    let (_, registry) = setup(&[("HOST", "x")]);
    let host = declare(
        &registry,
        SpecBuilder::new("HOST", "Host", StringSchema::<String>::new()).default_value("h".into()),
    );
    let port = declare(
        &registry,
        SpecBuilder::new("PORT", "Port", NumericSchema::<u16>::new()).default_value(80),
    );

    let address = Required::new((host, port.clone()));
    assert_eq!(address.value(), ("x".to_owned(), 80));
    assert_eq!(port.availability(), Availability::Default);
}

#[test]
fn test_composite_without_defaults_is_all_or_nothing() {
    let (_, registry) = setup(&[("USER", "admin")]);
    let user = declare(&registry, SpecBuilder::new("USER", "User", StringSchema::<String>::new()).optional());
    let password = declare(
        &registry,
        SpecBuilder::new("PASSWORD", "Password", StringSchema::<String>::new()).optional().sensitive(),
    );

    let err = Optional::new((user, password)).try_value().unwrap_err();
    assert_eq!(err.to_string(), "incomplete configuration: USER set, but PASSWORD not");

    let (_, registry) = setup(&[]);
    let user = declare(&registry, SpecBuilder::new("USER", "User", StringSchema::<String>::new()).optional());
    let password = declare(
        &registry,
        SpecBuilder::new("PASSWORD", "Password", StringSchema::<String>::new()).optional(),
    );
    assert_eq!(Optional::new((user, password)).try_value(), Ok(None));
}

#[test]
fn test_deprecated_explicit_value_needs_attention_but_is_valid() {
    let (_, registry) = setup(&[("LEGACY_MODE", "1")]);
    let legacy = declare(
        &registry,
        SpecBuilder::new("LEGACY_MODE", "Legacy mode", NumericSchema::<u8>::new()).deprecated(),
    );

    assert_eq!(legacy.availability(), Availability::Explicit);
    assert!(legacy.is_valid());
    assert_eq!(legacy.attention(), [Attention::Deprecated]);
    assert_eq!(Deprecated::new(legacy).deprecated_value(), Some(1));

    let validation = registry.validate();
    assert!(validation.is_valid());
    assert_eq!(validation.needing_attention().count(), 1);
}

#[test]
fn test_resolution_is_idempotent_across_threads() {
    static CHECKS: AtomicUsize = AtomicUsize::new(0);

    let (env, registry) = setup(&[("WORKERS", "8")]);
    let workers = declare(
        &registry,
        SpecBuilder::new("WORKERS", "Worker count", NumericSchema::<u32>::new()).constraint(
            Constraint::predicate("must be even", |v: &u32| {
                CHECKS.fetch_add(1, Ordering::SeqCst);
                v % 2 == 0
            }),
        ),
    );

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| workers.value())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| *r == Ok(Some(8))));
    assert_eq!(CHECKS.load(Ordering::SeqCst), 1);

    // Later environment changes are not observed.
    env.set("WORKERS", "3");
    assert_eq!(workers.value(), Ok(Some(8)));
    assert_eq!(CHECKS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_irrelevant_variable_ignores_malformed_value() {
    let (_, registry) = setup(&[("TLS_PORT", "not-a-port")]);
    let tls = declare(
        &registry,
        SpecBuilder::new("TLS", "Enable TLS", OtherSchema::<bool>::parsed()).default_value(false),
    );
    let tls_port = declare(&registry, SpecBuilder::new("TLS_PORT", "TLS port", NumericSchema::<u16>::new()));
    tls_port.depends_on_value(&tls, true).expect("Linking failed");

    assert_eq!(tls_port.availability(), Availability::None);
    assert_eq!(tls_port.relevance(), Relevance::Irrelevant { because: "TLS".into() });
    assert!(tls_port.is_valid());
    assert_eq!(tls_port.value(), Ok(None));
    assert!(registry.validate().is_valid());
}

#[test]
fn test_relevant_variable_reports_malformed_value() {
    let (_, registry) = setup(&[("TLS", "true"), ("TLS_PORT", "not-a-port")]);
    let tls = declare(&registry, SpecBuilder::new("TLS", "Enable TLS", OtherSchema::<bool>::parsed()));
    let tls_port = declare(&registry, SpecBuilder::new("TLS_PORT", "TLS port", NumericSchema::<u16>::new()));
    tls_port.depends_on_value(&tls, true).expect("Linking failed");

    assert!(tls_port.is_relevant());
    assert!(matches!(tls_port.error(), Some(ValueError::Schema { .. })));
    assert!(!registry.is_valid());
}

#[test]
fn test_duplicate_names_are_rejected_at_registration() {
    let (_, registry) = setup(&[]);
    declare(&registry, SpecBuilder::new("PORT", "Port", NumericSchema::<u16>::new()));

    let again = SpecBuilder::new("PORT", "Another port", StringSchema::<String>::new()).build().unwrap();
    let err = registry.register(again).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateName { .. }));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_dependency_cycle_is_a_configuration_error() {
    let (_, registry) = setup(&[]);
    let a = declare(&registry, SpecBuilder::new("A", "A", NumericSchema::<u8>::new()).optional());
    let b = declare(&registry, SpecBuilder::new("B", "B", NumericSchema::<u8>::new()).optional());
    let c = declare(&registry, SpecBuilder::new("C", "C", NumericSchema::<u8>::new()).optional());

    a.depends_on_presence(&b).unwrap();
    b.depends_on_presence(&c).unwrap();
    assert!(matches!(c.depends_on_presence(&a), Err(ConfigError::Cycle { .. })));
}

#[test]
fn test_resolved_spec_is_sealed() {
    let (_, registry) = setup(&[("OLD_PORT", "80")]);
    let old = declare(&registry, SpecBuilder::new("OLD_PORT", "Old port", NumericSchema::<u16>::new()).optional());
    let new = declare(&registry, SpecBuilder::new("PORT", "Port", NumericSchema::<u16>::new()).optional());
    new.supersedes(&old).unwrap();

    assert_eq!(old.attention(), [Attention::Superseded { by: "PORT".into() }]);
    assert!(old.spec().is_sealed());
    assert!(matches!(new.see_also(&old), Err(ConfigError::Sealed { .. })));
}

#[test]
fn test_sensitive_values_never_appear_in_reports() {
    let (_, registry) = setup(&[("API_TOKEN", "short")]);
    declare(
        &registry,
        SpecBuilder::new("API_TOKEN", "API token", StringSchema::<String>::new().min_len(16)).sensitive(),
    );

    let report = registry.validate().to_string();
    assert!(report.contains("API_TOKEN"));
    assert!(!report.contains("short"));
}

#[test]
fn test_sensitive_schema_errors_hide_the_input() {
    let (_, registry) = setup(&[("SECRET_MODE", "hunter2"), ("SECRET_KEY", "abcdeZ")]);
    let mode = declare(&registry, SpecBuilder::new("SECRET_MODE", "Mode", color_schema()).sensitive());
    let key = declare(
        &registry,
        SpecBuilder::new("SECRET_KEY", "Key", BinarySchema::<Vec<u8>>::new(BinaryEncoding::Hex)).sensitive(),
    );

    let key_err = key.error().expect("abcdeZ is not hex");
    assert_eq!(key_err.to_string(), "value of SECRET_KEY ([redacted]) is invalid: must be hex encoded");

    let validation = registry.validate();
    let rendered = [
        mode.error().expect("hunter2 is not a color").to_string(),
        format!("{:?}", mode.error()),
        format!("{key_err:?}"),
        validation.to_string(),
        format!("{validation:?}"),
    ];
    for text in &rendered {
        for leaked in ["hunter2", "abcdeZ", "position", "'Z'"] {
            assert!(!text.contains(leaked), "{leaked} leaked into {text}");
        }
    }
    assert!(rendered[0].ends_with(r#"must be one of "red", "green" or "blue""#));
}

#[test]
#[serial]
fn test_default_registry_lifecycle() {
    default_registry().reset();

    let spec = SpecBuilder::new("ENVSPEC_TEST_ONLY", "Test", StringSchema::<String>::new())
        .optional()
        .build()
        .unwrap();
    register(spec, &[]).unwrap();
    assert!(default_registry().contains("ENVSPEC_TEST_ONLY"));

    default_registry().reset();
    assert!(default_registry().is_empty());
}
