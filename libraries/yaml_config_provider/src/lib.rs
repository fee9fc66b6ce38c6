use std::path::Path;
use thiserror::Error;
use yaml_rust::{
    yaml::Hash,
    ScanError, YamlLoader,
};

use component_store::{ConfigError, ConfigProvider};

pub use yaml_rust::Yaml;

#[derive(Error, Debug)]
pub enum YamlConfigProviderError {
    #[error("Failed to read configuration file")]
    ReadFailed {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file")]
    ParseFailed {
        #[from]
        source: ScanError,
    },

    #[error("Invalid configuration format ({reason})")]
    InvalidFormat { reason: String },
}

const DOC_TYPE_REAL: &str = "real";
const DOC_TYPE_INTEGER: &str = "integer";
const DOC_TYPE_STRING: &str = "string";
const DOC_TYPE_BOOLEAN: &str = "boolean";
const DOC_TYPE_ARRAY: &str = "array";
const DOC_TYPE_DICT: &str = "dict";
const DOC_TYPE_ALIAS: &str = "alias";
const DOC_TYPE_NULL: &str = "null";
const DOC_TYPE_BAD_VALUE: &str = "bad value";

fn get_doc_type(doc: &Yaml) -> &'static str {
    match doc {
        Yaml::Real(_) => DOC_TYPE_REAL,
        Yaml::Integer(_) => DOC_TYPE_INTEGER,
        Yaml::String(_) => DOC_TYPE_STRING,
        Yaml::Boolean(_) => DOC_TYPE_BOOLEAN,
        Yaml::Array(_) => DOC_TYPE_ARRAY,
        Yaml::Hash(_) => DOC_TYPE_DICT,
        Yaml::Alias(_) => DOC_TYPE_ALIAS,
        Yaml::Null => DOC_TYPE_NULL,
        Yaml::BadValue => DOC_TYPE_BAD_VALUE,
    }
}

///
/// Provides configuration from a yaml document.
///
/// Sections are looked up by name; a section absent from the document reads
/// as an empty dict, so components with only optional settings need no entry.
///
#[derive(Debug)]
pub struct YamlConfigProvider {
    inner: Hash,
    path: Vec<String>,
}

impl Default for YamlConfigProvider {
    fn default() -> Self {
        Self {
            inner: Hash::new(),
            path: vec!["#".to_string()],
        }
    }
}

impl YamlConfigProvider {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Result<Self, YamlConfigProviderError> {
        let buf = std::fs::read_to_string(file_path.as_ref())?;
        Self::from_str(&buf)
    }

    pub fn from_str(buf: &str) -> Result<Self, YamlConfigProviderError> {
        let mut yaml = YamlLoader::load_from_str(buf)?;

        let doc = match yaml.drain(..).next() {
            Some(doc) => doc,
            // An empty file is an empty config.
            None => return Ok(Self::default()),
        };

        let inner =
            doc.as_hash()
                .cloned()
                .ok_or_else(|| YamlConfigProviderError::InvalidFormat {
                    reason: "root is not a dict".into(),
                })?;

        Ok(Self {
            inner,
            path: vec!["#".to_string()],
        })
    }

    ///
    /// Replaces `section.name` with `value`, creating the section if needed.
    /// Used to layer command line flags over the file contents.
    ///
    pub fn set(
        &mut self,
        section: &str,
        name: &str,
        value: Yaml,
    ) -> Result<(), YamlConfigProviderError> {
        let section_key = Yaml::String(section.to_string());

        if !self.inner.contains_key(&section_key) {
            self.inner.insert(section_key.clone(), Yaml::Hash(Hash::new()));
        }

        match self.inner.get_mut(&section_key) {
            Some(Yaml::Hash(hash)) => {
                hash.insert(Yaml::String(name.to_string()), value);
                Ok(())
            }
            other => Err(YamlConfigProviderError::InvalidFormat {
                reason: format!(
                    "section `{}` is of type `{}`, but `{}` was expected",
                    section,
                    other.map(|doc| get_doc_type(doc)).unwrap_or(DOC_TYPE_NULL),
                    DOC_TYPE_DICT
                ),
            }),
        }
    }

    ///
    /// Same as `set`, but leaves the document untouched for `None`.
    ///
    pub fn set_opt(
        &mut self,
        section: &str,
        name: &str,
        value: Option<Yaml>,
    ) -> Result<(), YamlConfigProviderError> {
        match value {
            Some(value) => self.set(section, name, value),
            None => Ok(()),
        }
    }

    fn get_doc(&self, name: &str) -> Result<&Yaml, ConfigError> {
        self.inner
            .get(&Yaml::from_str(name))
            .ok_or_else(|| ConfigError::NotFound {
                path: self.get_path(name).join("/"),
            })
    }

    fn get_path(&self, name: &str) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(name.to_string());

        path
    }
}

impl ConfigProvider for YamlConfigProvider {
    fn get_str(&self, name: &str) -> Result<&str, ConfigError> {
        let doc = self.get_doc(name)?;

        doc.as_str().ok_or_else(|| ConfigError::TypeMismatch {
            path: self.get_path(name).join("/"),
            expected_ty: DOC_TYPE_STRING,
            actual_ty: get_doc_type(doc),
        })
    }

    fn get_u64(&self, name: &str) -> Result<u64, ConfigError> {
        let value = self.get_i64(name)?;

        u64::try_from(value).map_err(|_| ConfigError::InvalidValue {
            path: self.get_path(name).join("/"),
            reason: format!("{} is negative", value),
        })
    }

    fn get_i64(&self, name: &str) -> Result<i64, ConfigError> {
        let doc = self.get_doc(name)?;

        doc.as_i64().ok_or_else(|| ConfigError::TypeMismatch {
            path: self.get_path(name).join("/"),
            expected_ty: DOC_TYPE_INTEGER,
            actual_ty: get_doc_type(doc),
        })
    }

    fn get_f64(&self, name: &str) -> Result<f64, ConfigError> {
        let doc = self.get_doc(name)?;

        doc.as_f64()
            .or_else(|| doc.as_i64().map(|i| i as f64))
            .ok_or_else(|| ConfigError::TypeMismatch {
                path: self.get_path(name).join("/"),
                expected_ty: DOC_TYPE_REAL,
                actual_ty: get_doc_type(doc),
            })
    }

    fn get_bool(&self, name: &str) -> Result<bool, ConfigError> {
        let doc = self.get_doc(name)?;

        doc.as_bool().ok_or_else(|| ConfigError::TypeMismatch {
            path: self.get_path(name).join("/"),
            expected_ty: DOC_TYPE_BOOLEAN,
            actual_ty: get_doc_type(doc),
        })
    }

    fn get_subconfig(&self, name: &str) -> Result<Box<dyn ConfigProvider>, ConfigError> {
        let inner = match self.get_doc(name) {
            Ok(doc) => doc
                .as_hash()
                .cloned()
                .ok_or_else(|| ConfigError::TypeMismatch {
                    path: self.get_path(name).join("/"),
                    expected_ty: DOC_TYPE_DICT,
                    actual_ty: get_doc_type(doc),
                })?,
            Err(ConfigError::NotFound { .. }) => Hash::new(),
            Err(err) => return Err(err),
        };

        Ok(Box::new(YamlConfigProvider {
            inner,
            path: self.get_path(name),
        }))
    }

    fn path_of(&self, name: &str) -> String {
        self.get_path(name).join("/")
    }
}
