use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an integer primary-key newtype as issued by the backend.
macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

backend_id!(
    /// A user account.
    UserId
);
backend_id!(
    /// A chat group.
    GroupId
);
backend_id!(
    /// A persisted chat message.
    MessageId
);
backend_id!(
    /// A task notification.
    NotificationId
);
backend_id!(TaskId);
backend_id!(WarehouseId);
