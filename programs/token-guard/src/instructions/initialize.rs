use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

use crate::{
    constants::MINT_AUTHORITY_SEED,
    events::TokenGuardInitialized,
    state::{MembershipRequirement, TokenGuard},
};

/// Create a new `TokenGuard` configuration.
/// The output mint must already be controlled by the guard's derived mint authority.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The new token guard. Its address is the configuration's identifier.
    #[account(
        init,
        payer = authority,
        space = 8 + TokenGuard::INIT_SPACE,
    )]
    pub token_guard: Account<'info, TokenGuard>,

    /// Creates the token guard and pays for it
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The mint whose tokens are handed out on exchange
    #[account(mint::authority = mint_authority)]
    pub out_mint: InterfaceAccount<'info, Mint>,

    /// The token guard's mint authority PDA
    /// # PDA Seeds
    /// - MINT_AUTHORITY_SEED
    /// - The token guard's address
    /// CHECK: Holds no data, only signs mint instructions for this guard.
    #[account(
        seeds = [MINT_AUTHORITY_SEED, token_guard.key().as_ref()],
        bump,
    )]
    pub mint_authority: UncheckedAccount<'info>,

    /// CHECK: Receives the SOL paid on every exchange; any account may receive.
    pub recipient: UncheckedAccount<'info>,

    /// The system program
    pub system_program: Program<'info, System>,
}

impl<'info> Initialize<'info> {
    /// Store the token guard configuration.
    /// # Arguments
    /// * `gatekeeper_network` - If set, requesters must present an active gateway token on this network.
    /// * `start_time` - If set, exchanges before this unix timestamp are rejected.
    /// * `allowance` - If set, the number of exchanges allowed per principal.
    /// * `max_amount` - If set, the largest number of lamports accepted in one exchange.
    /// * `membership` - If set, the membership token requesters must present.
    /// * `bumps` - Bumps for PDA derivation.
    /// # Returns
    /// * `Result<()>` - Result indicating success or failure.
    pub fn initialize(
        &mut self,
        gatekeeper_network: Option<Pubkey>,
        start_time: Option<i64>,
        allowance: Option<u32>,
        max_amount: Option<u64>,
        membership: Option<MembershipRequirement>,
        bumps: &InitializeBumps,
    ) -> Result<()> {
        self.token_guard.set_inner(TokenGuard {
            authority: self.authority.key(),
            recipient: self.recipient.key(),
            out_mint: self.out_mint.key(),
            gatekeeper_network,
            start_time,
            allowance,
            max_amount,
            membership,
            mint_authority_bump: bumps.mint_authority,
        });
        self.token_guard.validate()?;

        emit!(TokenGuardInitialized {
            token_guard: self.token_guard.key(),
            authority: self.authority.key(),
            recipient: self.recipient.key(),
            out_mint: self.out_mint.key(),
            gatekeeper_network,
            start_time,
            allowance,
            max_amount,
            membership,
        });

        Ok(())
    }
}
