use anchor_lang::prelude::*;

#[error_code]
pub enum TokenGuardError {
    #[msg("TokenGuard is not yet live")]
    NotLiveYet,
    #[msg("No valid gateway token was presented for the gatekeeper network")]
    NoValidCredential,
    #[msg("A membership token is required but none was presented")]
    MissingMembershipEvidence,
    #[msg("The presented membership token does not satisfy the membership requirement")]
    InvalidMembershipEvidence,
    #[msg("The amount exceeds the maximum amount allowed by this TokenGuard")]
    AmountTooLarge,
    #[msg("The allowed number of exchanges for this TokenGuard has been reached")]
    AllowanceExceeded,
    #[msg("The allowance account does not belong to the expected principal")]
    AllowancePrincipalMismatch,
    #[msg("Invalid TokenGuard configuration")]
    InvalidConfiguration,
    #[msg("Not enough SOL to pay for this exchange")]
    InsufficientFunds,
    #[msg("Invalid Amount")]
    InvalidAmount,
    #[msg("Math Overflow")]
    MathOverflow,
}

/// The anchor error code carried by a failed result, if any
#[cfg(test)]
pub(crate) fn error_code<T>(result: Result<T>) -> Option<u32> {
    match result {
        Err(anchor_lang::error::Error::AnchorError(e)) => Some(e.error_code_number),
        _ => None,
    }
}
