use serde::{Deserialize, Serialize};

/// Declares a string-backed identity key. Identity keys are the single field
/// an entity is compared, hashed, and deduplicated by.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

/// Implements `PartialEq`, `Eq`, and `Hash` for an entity using only the
/// listed key fields. Every other field is ignored, so two values that share
/// a key collapse to one entry in any uniqueness-enforcing collection.
macro_rules! identity_keyed {
    ($ty:ty, $($key:ident),+) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $(self.$key == other.$key)&&+
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                $(self.$key.hash(state);)+
            }
        }
    };
}

pub(crate) use identity_keyed;

string_id! {
    /// Identifies a workplace (a node of the process graph).
    WorkplaceId
}

string_id! {
    /// Identifies a worker.
    WorkerId
}

string_id! {
    /// Identifies a piece of equipment.
    EquipmentId
}

string_id! {
    /// Identifies a logistics operator.
    LogistId
}

string_id! {
    /// Identifies a tender (an accepted production order).
    TenderId
}

string_id! {
    /// Identifies a consumer placing tenders.
    ConsumerId
}

string_id! {
    /// Identifies a material supplier.
    SupplierId
}

string_id! {
    /// Identifies a lean or production improvement.
    ImprovementId
}
