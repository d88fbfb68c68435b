use envspec::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
}

/// A set schema over [`Color`] with lower-case literals.
#[must_use]
pub fn color_schema() -> SetSchema<Color> {
    SetSchema::new()
        .member(Color::Red, "red", "Warm")
        .member(Color::Green, "green", "Natural")
        .member(Color::Blue, "blue", "Cold")
}

/// An in-memory environment seeded with `vars`, and a fresh registry reading from it.
#[must_use]
pub fn setup(vars: &[(&str, &str)]) -> (MapEnv, Registry) {
    let env: MapEnv = vars.iter().copied().collect();
    let registry = Registry::builder("test", "Test application").lookup(env.clone()).build();
    (env, registry)
}

/// Builds and registers `builder`.
/// # Panics
/// * If the declaration is rejected.
pub fn declare<T: envspec::Value>(registry: &Registry, builder: SpecBuilder<T>) -> Variable<T> {
    let spec = builder.build().expect("Spec declaration failed");
    registry.register(spec).expect("Registration failed")
}
