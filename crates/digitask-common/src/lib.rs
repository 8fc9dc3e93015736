pub mod auth;
pub mod errors;
pub mod id;
pub mod notices;

pub use auth::{AuthSession, CurrentUser};
pub use errors::{ApiError, ConfigError, DigitaskError, RealtimeError};
pub use id::{GroupId, MessageId, NotificationId, TaskId, UserId, WarehouseId};
pub use notices::{Notice, NoticeBoard};

pub type Result<T> = std::result::Result<T, DigitaskError>;
