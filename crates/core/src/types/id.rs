//! Newtype IDs for type-safe document references.
//!
//! Firestore document IDs are opaque strings. Use the `define_id!` macro to
//! create wrappers that prevent accidentally mixing IDs from different
//! collections (a `BrandId` can never be passed where a `CategoryId` is
//! expected).

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use camrent_core::define_id;
/// define_id!(LensId);
/// define_id!(BodyId);
///
/// let lens = LensId::new("abc");
/// let body = BodyId::new("abc");
///
/// assert_eq!(lens.as_str(), body.as_str());
/// // These are different types, so this won't compile:
/// // let _: LensId = body;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying document ID.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Returns `true` if the ID is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// One ID type per collection
define_id!(ProductId);
define_id!(CategoryId);
define_id!(BrandId);
define_id!(BannerId);
define_id!(LogoId);
define_id!(BgImageId);
define_id!(PopupId);
define_id!(SubmissionId);
define_id!(UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_conversions() {
        let id = ProductId::new("x7Gh2");
        assert_eq!(id.to_string(), "x7Gh2");
        assert_eq!(id.as_str(), "x7Gh2");
        assert_eq!(ProductId::from("x7Gh2"), id);
        assert_eq!(String::from(id), "x7Gh2");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = CategoryId::new("lenses");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"lenses\""));
    }
}
