#![allow(unexpected_cfgs)]
#![allow(deprecated)]

use anchor_lang::prelude::*;
#[cfg(not(target_os = "solana"))]
pub mod client;
pub mod constants;
pub mod errors;
pub mod events;
mod instructions;
pub mod membership;
pub mod security;
pub mod state;
pub mod utils;

use events::ExchangeExecuted;
use instructions::*;
use state::MembershipRequirement;

declare_id!("tg7bdEQom2SZT1JB2d77RDJFYaL4eZ2FcM8HZZAg5Z8");

#[program]
pub mod token_guard {
    use super::*;

    /// Create a token guard for an output mint
    ///
    /// The mint's authority must already be the guard's derived mint authority.
    pub fn initialize(
        ctx: Context<Initialize>,
        gatekeeper_network: Option<Pubkey>,
        start_time: Option<i64>,
        allowance: Option<u32>,
        max_amount: Option<u64>,
        membership: Option<MembershipRequirement>,
    ) -> Result<()> {
        ctx.accounts.initialize(
            gatekeeper_network,
            start_time,
            allowance,
            max_amount,
            membership,
            &ctx.bumps,
        )
    }

    /// Exchange SOL for the guard's output token
    ///
    /// Passes the time, gateway token, membership, amount and allowance gates in that order.
    /// `allowance_principal` is the key the caller expects the allowance to be charged to.
    pub fn exchange<'info>(
        ctx: Context<'_, '_, 'info, 'info, Exchange<'info>>,
        lamports: u64,
        allowance_principal: Pubkey,
    ) -> Result<()> {
        let accepted = ctx.accounts.exchange(
            lamports,
            allowance_principal,
            ctx.remaining_accounts,
            &ctx.bumps,
        )?;

        emit_cpi!(ExchangeExecuted {
            token_guard: ctx.accounts.token_guard.key(),
            requester: ctx.accounts.payer.key(),
            principal: accepted.principal,
            lamports,
            count: accepted.count,
        });

        Ok(())
    }
}
