pub mod admin_token;
pub mod quota;
pub mod subscription;
pub mod usage;
pub mod users;

pub use admin_token::AdminTokenService;
pub use quota::QuotaService;
pub use subscription::{format_key_code, SubscriptionService};
pub use usage::UsageService;
pub use users::UsersService;
