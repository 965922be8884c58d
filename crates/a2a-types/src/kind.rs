//! Literal `kind` discriminants carried by protocol objects.
//!
//! Each marker always serializes to its literal. Decoding accepts only that
//! literal; an absent field falls back to it through `#[serde(default)]`.

use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! kind_marker {
    ($(#[$doc:meta])* $name:ident, $literal:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl $name {
            pub const VALUE: &'static str = $literal;
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($literal)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                if value == $literal {
                    Ok($name)
                } else {
                    Err(D::Error::invalid_value(Unexpected::Str(&value), &$literal))
                }
            }
        }
    };
}

kind_marker!(
    /// `"kind": "message"`
    MessageKind,
    "message"
);
kind_marker!(
    /// `"kind": "task"`
    TaskKind,
    "task"
);
