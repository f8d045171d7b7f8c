/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` and call `Config::from_env()` at
/// startup. Field `database_url` is read from `DATABASE_URL`, and so on;
/// use `#[serde(default = "...")]` for optional settings.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
