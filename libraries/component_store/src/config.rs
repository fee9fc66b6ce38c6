use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration field `{path}` is missing")]
    NotFound { path: String },

    #[error(
        "Configuration field `{path}` is of type `{actual_ty}`, but `{expected_ty}` was expected"
    )]
    TypeMismatch {
        path: String,
        expected_ty: &'static str,
        actual_ty: &'static str,
    },

    #[error("Configuration field `{path}` is invalid ({reason})")]
    InvalidValue { path: String, reason: String },
}

pub trait ConfigProvider: Send + Sync + 'static {
    fn get_str(&self, name: &str) -> Result<&str, ConfigError>;
    fn get_u64(&self, name: &str) -> Result<u64, ConfigError>;
    fn get_i64(&self, name: &str) -> Result<i64, ConfigError>;
    fn get_f64(&self, name: &str) -> Result<f64, ConfigError>;
    fn get_bool(&self, name: &str) -> Result<bool, ConfigError>;
    fn get_subconfig(&self, name: &str) -> Result<Box<dyn ConfigProvider>, ConfigError>;

    /// Full path of `name` as reported in errors.
    fn path_of(&self, name: &str) -> String {
        name.to_string()
    }

    ///
    /// Same as `get_str`, but rejects empty values.
    ///
    fn get_required_str(&self, name: &str) -> Result<&str, ConfigError> {
        let value = self.get_str(name)?;
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                path: self.path_of(name),
                reason: "value is empty".into(),
            });
        }

        Ok(value)
    }

    fn get_u64_or(&self, name: &str, default: u64) -> Result<u64, ConfigError> {
        match self.get_u64(name) {
            Err(ConfigError::NotFound { .. }) => Ok(default),
            res => res,
        }
    }

    fn get_bool_or(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get_bool(name) {
            Err(ConfigError::NotFound { .. }) => Ok(default),
            res => res,
        }
    }

    fn get_opt_u64(&self, name: &str) -> Result<Option<u64>, ConfigError> {
        match self.get_u64(name) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn get_opt_str(&self, name: &str) -> Result<Option<&str>, ConfigError> {
        match self.get_str(name) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
