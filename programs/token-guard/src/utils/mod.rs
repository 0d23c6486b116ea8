pub mod derivation;
pub mod gates;
#[cfg(test)]
pub(crate) mod test_accounts;

pub use derivation::*;
pub use gates::*;
