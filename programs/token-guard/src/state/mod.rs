pub mod allowance_account;
pub mod gateway_token;
pub mod token_guard;

pub use allowance_account::*;
pub use gateway_token::*;
pub use token_guard::*;
