/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; every field maps to the
/// upper-cased env var of the same name. Missing optional fields fall back to
/// their `#[serde(default)]` values.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Load from the process environment.
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load from an explicit set of `(KEY, value)` pairs. Used by tests so they
    /// never touch the process environment.
    fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
