use serde::{Deserialize, Deserializer};

/// Identifiers come back as JSON numbers from some endpoints and as strings from others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(|raw| match raw {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $name(#[serde(deserialize_with = "crate::models::ids::deserialize_id")] pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use opaque_id;
