use anchor_lang::prelude::*;

use crate::{errors::TokenGuardError, membership::MembershipEvidence};

/// How a membership token is matched against the requirement's `key`
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub enum Strategy {
    /// `key` is an SPL mint; the requester must hold at least one token of it
    MembershipSplToken,
    /// `key` is the update authority of the NFT's metadata
    MembershipNftUpdateAuthority,
    /// `key` is a verified creator of the NFT's metadata
    MembershipNftCreator,
}

impl Strategy {
    /// NFT strategies charge the allowance to the NFT rather than the wallet
    pub fn is_nft(&self) -> bool {
        matches!(
            self,
            Strategy::MembershipNftUpdateAuthority | Strategy::MembershipNftCreator
        )
    }
}

/// Membership token a requester must present
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct MembershipRequirement {
    // Mint (SPL strategy), update authority or creator (NFT strategies)
    pub key: Pubkey,

    // How `key` is matched against the presented token
    pub strategy: Strategy,
}

/// TokenGuard state account - configuration of a single guarded exchange.
/// Written once by `initialize` and never mutated afterwards.
#[account]
#[derive(InitSpace, Debug)]
pub struct TokenGuard {
    // The account that created this token guard
    pub authority: Pubkey,

    // The account that receives the SOL paid in on every exchange
    pub recipient: Pubkey,

    // The token minted to the requester on every exchange
    pub out_mint: Pubkey,

    // If set, requesters need an active gateway token on this network
    pub gatekeeper_network: Option<Pubkey>,

    // If set, exchanges are rejected before this unix timestamp
    pub start_time: Option<i64>,

    // If set, the maximum number of exchanges per principal
    pub allowance: Option<u32>,

    // If set, the maximum lamports accepted in a single exchange
    pub max_amount: Option<u64>,

    // If set, requesters must present a matching membership token
    pub membership: Option<MembershipRequirement>,

    // The bump used to derive the mint authority PDA
    // Stored so we don't need to recalculate it later
    pub mint_authority_bump: u8,
}

impl TokenGuard {
    /// Validate the optional gating parameters before they are stored
    pub fn validate(&self) -> Result<()> {
        if let Some(allowance) = self.allowance {
            require_gt!(allowance, 0, TokenGuardError::InvalidConfiguration);
        }

        if let Some(max_amount) = self.max_amount {
            require_gt!(max_amount, 0, TokenGuardError::InvalidConfiguration);
        }

        if let Some(network) = self.gatekeeper_network {
            require_keys_neq!(network, Pubkey::default(), TokenGuardError::InvalidConfiguration);
        }

        if let Some(membership) = self.membership {
            require_keys_neq!(
                membership.key,
                Pubkey::default(),
                TokenGuardError::InvalidConfiguration
            );
        }

        Ok(())
    }

    pub fn check_start_time(&self, now: i64) -> Result<()> {
        if let Some(start_time) = self.start_time {
            if now < start_time {
                msg!("Not live yet: now {} < start time {}", now, start_time);
                return err!(TokenGuardError::NotLiveYet);
            }
        }

        Ok(())
    }

    pub fn check_max_amount(&self, lamports: u64) -> Result<()> {
        if let Some(max_amount) = self.max_amount {
            if lamports > max_amount {
                msg!("Amount {} exceeds maximum {}", lamports, max_amount);
                return err!(TokenGuardError::AmountTooLarge);
            }
        }

        Ok(())
    }

    /// The key the allowance is charged to.
    ///
    /// If the guard requires a membership NFT and one was presented, the allowance follows
    /// the NFT's mint: the NFT cannot be used more than `allowance` times, even after it is
    /// transferred to another wallet. Otherwise the allowance follows the requester's wallet.
    pub fn allowance_principal(
        &self,
        requester: &Pubkey,
        evidence: Option<&MembershipEvidence>,
    ) -> Pubkey {
        match (self.membership, evidence) {
            (Some(requirement), Some(evidence)) if requirement.strategy.is_nft() => evidence
                .membership_mint()
                .unwrap_or(*requester),
            _ => *requester,
        }
    }
}
