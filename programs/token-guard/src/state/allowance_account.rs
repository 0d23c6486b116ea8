use anchor_lang::prelude::*;

use crate::errors::TokenGuardError;

/// AllowanceAccount state account - counts the exchanges charged to one principal
/// (a wallet or a membership NFT mint) under one token guard
#[account]
#[derive(InitSpace, Debug, Default)]
pub struct AllowanceAccount {
    // The token guard this counter belongs to
    pub token_guard: Pubkey,

    // The wallet or membership NFT mint the exchanges are charged to
    pub principal: Pubkey,

    // The number of accepted exchanges, never decremented
    pub count: u32,

    // The bump used to derive the PDA for this account
    // Stored so we don't need to recalculate it later
    pub bump: u8,
}

impl AllowanceAccount {
    /// Initializes the allowance account if it has just been created.
    /// A freshly created account is all zeroes, so an unset `token_guard` marks it as new.
    /// # Arguments
    /// * `token_guard` - The token guard the account belongs to.
    /// * `principal` - The key the account's address was derived from.
    /// * `bump` - The bump seed used for PDA derivation.
    /// # Returns
    /// * `Result<()>` - Ok if the account is new or already belongs to `token_guard` and `principal`.
    pub fn initialize_if_needed(
        &mut self,
        token_guard: Pubkey,
        principal: Pubkey,
        bump: u8,
    ) -> Result<()> {
        if self.token_guard == Pubkey::default() {
            self.token_guard = token_guard;
            self.principal = principal;
            self.count = 0;
            self.bump = bump;

            msg!("Allowance account initialized for {}", principal);
        }

        require_keys_eq!(
            self.token_guard,
            token_guard,
            TokenGuardError::AllowancePrincipalMismatch
        );
        require_keys_eq!(
            self.principal,
            principal,
            TokenGuardError::AllowancePrincipalMismatch
        );

        Ok(())
    }

    /// Charges one exchange to this principal.
    /// Fails without changing the count if `allowance` is set and already used up.
    /// # Arguments
    /// * `allowance` - The token guard's per-principal limit, if any.
    /// # Returns
    /// * `Result<u32>` - The count after this exchange.
    pub fn check_and_increment(&mut self, allowance: Option<u32>) -> Result<u32> {
        if let Some(allowance) = allowance {
            if self.count >= allowance {
                msg!("Allowance of {} reached for {}", allowance, self.principal);
                return err!(TokenGuardError::AllowanceExceeded);
            }
        }

        self.count = self
            .count
            .checked_add(1)
            .ok_or(TokenGuardError::MathOverflow)?;

        Ok(self.count)
    }
}
