use anchor_lang::prelude::*;

use crate::state::MembershipRequirement;

/// Event emitted when a new token guard is created
/// Fields:
/// - token_guard: The address of the new token guard
/// - authority: The account that created the token guard
/// - recipient: The account receiving SOL on every exchange
/// - out_mint: The token minted on every exchange
/// - gatekeeper_network: The gatekeeper network requesters need a gateway token for, if any
/// - start_time: The earliest time exchanges are accepted, if any
/// - allowance: The maximum number of exchanges per principal, if any
/// - max_amount: The maximum lamports accepted per exchange, if any
/// - membership: The membership requirement, if any
#[event]
pub struct TokenGuardInitialized {
    pub token_guard: Pubkey,
    pub authority: Pubkey,
    pub recipient: Pubkey,
    pub out_mint: Pubkey,
    pub gatekeeper_network: Option<Pubkey>,
    pub start_time: Option<i64>,
    pub allowance: Option<u32>,
    pub max_amount: Option<u64>,
    pub membership: Option<MembershipRequirement>,
}

/// Event emitted when an exchange is accepted
/// Fields:
/// - token_guard: The token guard the exchange went through
/// - requester: The account that paid SOL and received tokens
/// - principal: The key the allowance is charged to (requester or membership NFT mint)
/// - lamports: The SOL paid, equal to the number of tokens minted
/// - count: The principal's exchange count after this exchange
#[event]
pub struct ExchangeExecuted {
    pub token_guard: Pubkey,
    pub requester: Pubkey,
    pub principal: Pubkey,
    pub lamports: u64,
    pub count: u32,
}
