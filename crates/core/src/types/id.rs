//! Newtype IDs for type-safe entity references.
//!
//! The backend identifies every record by an opaque string (a document
//! object id). Use the `define_id!` macro to create wrappers that prevent
//! accidentally passing a drug id where an order id is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `FromStr` (for CLI argument parsing)
///
/// # Example
///
/// ```rust
/// # use clinic_admin_core::define_id;
/// define_id!(WardId);
/// define_id!(BedId);
///
/// let ward = WardId::new("65a1");
/// let bed = BedId::new("65a1");
///
/// // These are different types, so this won't compile:
/// // let _: WardId = bed;
/// assert_eq!(ward.as_str(), bed.as_str());
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
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from its backend string form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }
    };
}

define_id!(DoctorId);
define_id!(AppointmentId);
define_id!(DrugId);
define_id!(OrderId);
define_id!(PatientId);
