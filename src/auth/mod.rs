pub mod extractors;
pub mod token;

pub use extractors::AdminAuth;
pub use token::generate_token;
