pub mod admin_token;
pub mod quota;
pub mod subscription;
pub mod usage;
pub mod user;

pub use admin_token::{AdminToken, CreateAdminToken};
pub use quota::{DailyServiceUsage, ServiceQueryLimit, SetServiceLimit};
pub use subscription::{
    ActiveKeyInfo, GenerateKeyRequest, KeyRedemption, RedeemKeyRequest, Subscription,
    SubscriptionKey,
};
pub use usage::{UserQueryTotal, UserSearch};
pub use user::{CreateUser, User};
