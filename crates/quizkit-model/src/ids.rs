//! Identifier newtypes.
//!
//! Ids are opaque strings. Freshly generated ids carry a kind prefix
//! (`page-`, `question-`, `option-`) followed by a v4 UUID.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh, globally unique id.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), Uuid::new_v4().simple()))
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Page identifier, unique across a document's page order.
    PageId,
    "page"
);
string_id!(
    /// Question identifier, unique across the whole document.
    QuestionId,
    "question"
);
string_id!(
    /// Option identifier, unique within its question.
    OptionId,
    "option"
);
