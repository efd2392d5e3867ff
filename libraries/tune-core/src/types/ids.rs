/// ID types for TuneViewer entities
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "sqlx-support")]
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, Sqlite, Type,
};

/// Declares an integer-backed identifier newtype.
///
/// Every entity is keyed by an SQLite `INTEGER PRIMARY KEY`, so the wrappers
/// only exist to keep a `TrackId` from being passed where a `PlaylistId` is
/// expected.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw row id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl Type<Sqlite> for $name {
            fn type_info() -> SqliteTypeInfo {
                <i64 as Type<Sqlite>>::type_info()
            }

            fn compatible(ty: &SqliteTypeInfo) -> bool {
                <i64 as Type<Sqlite>>::compatible(ty)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                args: &mut Vec<SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <i64 as Encode<Sqlite>>::encode_by_ref(&self.0, args)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let id = <i64 as Decode<Sqlite>>::decode(value)?;
                Ok(Self(id))
            }
        }
    };
}

entity_id!(
    /// User identifier
    UserId
);

entity_id!(
    /// Track identifier
    TrackId
);

entity_id!(
    /// Playlist identifier
    PlaylistId
);

entity_id!(
    /// Review identifier
    ReviewId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_from_string() {
        let id: TrackId = "123".parse().unwrap();
        assert_eq!(id.get(), 123);
    }

    #[test]
    fn track_id_rejects_garbage() {
        assert!("abc".parse::<TrackId>().is_err());
    }

    #[test]
    fn playlist_id_display() {
        let id = PlaylistId::new(456);
        assert_eq!(format!("{}", id), "456");
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");

        let back: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(back, UserId::new(7));
    }
}
