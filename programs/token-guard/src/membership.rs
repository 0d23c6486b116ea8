//! Membership strategy resolution.
//!
//! A token guard may require requesters to present a membership token. The evidence is
//! passed in the exchange instruction's remaining accounts, in an order fixed by the
//! guard's [`Strategy`]:
//!
//! | Strategy                       | Remaining accounts           |
//! |--------------------------------|------------------------------|
//! | `MembershipSplToken`           | `[holding]`                  |
//! | `MembershipNftUpdateAuthority` | `[holding, mint, metadata]`  |
//! | `MembershipNftCreator`         | `[holding, mint, metadata]`  |
//!
//! Parsing never skips a check: a missing, unowned or unparsable account rejects the
//! exchange with `InvalidMembershipEvidence`.

use anchor_lang::{prelude::*, AccountDeserialize, Id};
use anchor_spl::{
    metadata::{Metadata, MetadataAccount},
    token::ID as TOKEN_PROGRAM_ID,
    token_2022::ID as TOKEN_2022_PROGRAM_ID,
    token_interface::TokenAccount,
};

use crate::{
    constants::{MIN_MEMBERSHIP_BALANCE, NFT_EVIDENCE_ACCOUNTS, SPL_EVIDENCE_ACCOUNTS},
    errors::TokenGuardError,
    state::{MembershipRequirement, Strategy},
    utils::derive_metadata_address,
};

/// A token account presented as membership evidence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Holding {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl Holding {
    pub fn from_account_info(account: &AccountInfo) -> Result<Self> {
        let owner = *account.owner;
        if owner != TOKEN_PROGRAM_ID && owner != TOKEN_2022_PROGRAM_ID {
            msg!("Membership token {} is not a token account", account.key());
            return err!(TokenGuardError::InvalidMembershipEvidence);
        }

        let data = account.try_borrow_data()?;
        let token_account = TokenAccount::try_deserialize(&mut &data[..]).map_err(|_| {
            msg!("Membership token {} could not be parsed", account.key());
            error!(TokenGuardError::InvalidMembershipEvidence)
        })?;

        Ok(Self {
            address: account.key(),
            mint: token_account.mint,
            owner: token_account.owner,
            amount: token_account.amount,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatorEntry {
    pub address: Pubkey,
    pub verified: bool,
}

/// The metadata account describing a membership NFT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub creators: Vec<CreatorEntry>,
}

impl Descriptor {
    pub fn from_account_info(account: &AccountInfo) -> Result<Self> {
        if *account.owner != Metadata::id() {
            msg!("Metadata {} is not owned by the metadata program", account.key());
            return err!(TokenGuardError::InvalidMembershipEvidence);
        }

        let data = account.try_borrow_data()?;
        let metadata = MetadataAccount::try_deserialize(&mut &data[..]).map_err(|_| {
            msg!("Metadata {} could not be parsed", account.key());
            error!(TokenGuardError::InvalidMembershipEvidence)
        })?;

        Ok(Self {
            address: account.key(),
            mint: metadata.mint,
            update_authority: metadata.update_authority,
            creators: metadata
                .creators
                .iter()
                .flatten()
                .map(|creator| CreatorEntry {
                    address: creator.address,
                    verified: creator.verified,
                })
                .collect(),
        })
    }

    fn has_verified_creator(&self, key: &Pubkey) -> bool {
        self.creators
            .iter()
            .any(|creator| creator.address == *key && creator.verified)
    }
}

/// Membership evidence, parsed according to the guard's strategy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MembershipEvidence {
    SplBalance {
        holding: Holding,
    },
    NftUpdateAuthority {
        holding: Holding,
        mint: Pubkey,
        descriptor: Descriptor,
    },
    NftCreator {
        holding: Holding,
        mint: Pubkey,
        descriptor: Descriptor,
    },
}

impl MembershipEvidence {
    /// Resolves the evidence a token guard requires from the instruction's remaining accounts.
    /// # Arguments
    /// * `requirement` - The token guard's membership requirement, if any.
    /// * `accounts` - The remaining accounts of the exchange instruction.
    /// # Returns
    /// * `Result<Option<Self>>` - `None` if no membership is required, the parsed evidence otherwise.
    /// # Errors
    /// * `TokenGuardError::MissingMembershipEvidence` - If membership is required but no accounts were passed
    /// * `TokenGuardError::InvalidMembershipEvidence` - If the accounts do not have the expected shape
    pub fn resolve(
        requirement: Option<&MembershipRequirement>,
        accounts: &[AccountInfo],
    ) -> Result<Option<Self>> {
        let Some(requirement) = requirement else {
            return Ok(None);
        };

        if accounts.is_empty() {
            msg!("Membership token required but not presented");
            return err!(TokenGuardError::MissingMembershipEvidence);
        }

        Self::from_accounts(requirement.strategy, accounts).map(Some)
    }

    fn from_accounts(strategy: Strategy, accounts: &[AccountInfo]) -> Result<Self> {
        match strategy {
            Strategy::MembershipSplToken => {
                require_gte!(
                    accounts.len(),
                    SPL_EVIDENCE_ACCOUNTS,
                    TokenGuardError::InvalidMembershipEvidence
                );
                Ok(Self::SplBalance {
                    holding: Holding::from_account_info(&accounts[0])?,
                })
            }
            Strategy::MembershipNftUpdateAuthority | Strategy::MembershipNftCreator => {
                require_gte!(
                    accounts.len(),
                    NFT_EVIDENCE_ACCOUNTS,
                    TokenGuardError::InvalidMembershipEvidence
                );
                let holding = Holding::from_account_info(&accounts[0])?;
                let mint = accounts[1].key();
                let descriptor = Descriptor::from_account_info(&accounts[2])?;

                Ok(match strategy {
                    Strategy::MembershipNftUpdateAuthority => Self::NftUpdateAuthority {
                        holding,
                        mint,
                        descriptor,
                    },
                    _ => Self::NftCreator {
                        holding,
                        mint,
                        descriptor,
                    },
                })
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::SplBalance { .. } => Strategy::MembershipSplToken,
            Self::NftUpdateAuthority { .. } => Strategy::MembershipNftUpdateAuthority,
            Self::NftCreator { .. } => Strategy::MembershipNftCreator,
        }
    }

    /// The NFT mint presented, for NFT strategies
    pub fn membership_mint(&self) -> Option<Pubkey> {
        match self {
            Self::SplBalance { .. } => None,
            Self::NftUpdateAuthority { mint, .. } | Self::NftCreator { mint, .. } => Some(*mint),
        }
    }

    /// Checks the evidence against the guard's requirement, in order:
    /// holding, then (for NFTs) the metadata's authority or creator, then the metadata address.
    pub fn verify(&self, requirement: &MembershipRequirement, requester: &Pubkey) -> Result<()> {
        require!(
            self.strategy() == requirement.strategy,
            TokenGuardError::InvalidMembershipEvidence
        );

        match self {
            Self::SplBalance { holding } => check_holding(holding, requester, &requirement.key),
            Self::NftUpdateAuthority {
                holding,
                mint,
                descriptor,
            } => {
                check_holding(holding, requester, mint)?;
                if descriptor.update_authority != requirement.key {
                    msg!(
                        "Membership NFT update authority {} does not match {}",
                        descriptor.update_authority,
                        requirement.key
                    );
                    return err!(TokenGuardError::InvalidMembershipEvidence);
                }
                check_descriptor(descriptor, mint)
            }
            Self::NftCreator {
                holding,
                mint,
                descriptor,
            } => {
                check_holding(holding, requester, mint)?;
                // Only verified creators count
                if !descriptor.has_verified_creator(&requirement.key) {
                    msg!(
                        "Membership NFT has no verified creator {}",
                        requirement.key
                    );
                    return err!(TokenGuardError::InvalidMembershipEvidence);
                }
                check_descriptor(descriptor, mint)
            }
        }
    }
}

/// The remaining accounts an exchange must carry for `strategy`, in order.
/// `holding_mint` is the mint of the presented holding account.
pub fn evidence_account_keys(
    strategy: Strategy,
    holding: Pubkey,
    holding_mint: Pubkey,
) -> Vec<Pubkey> {
    match strategy {
        Strategy::MembershipSplToken => vec![holding],
        Strategy::MembershipNftUpdateAuthority | Strategy::MembershipNftCreator => vec![
            holding,
            holding_mint,
            derive_metadata_address(&holding_mint),
        ],
    }
}

fn check_holding(holding: &Holding, requester: &Pubkey, expected_mint: &Pubkey) -> Result<()> {
    if holding.mint != *expected_mint {
        msg!(
            "Membership token mint {} does not match {}",
            holding.mint,
            expected_mint
        );
        return err!(TokenGuardError::InvalidMembershipEvidence);
    }

    if holding.owner != *requester {
        msg!("Membership token is owned by {}", holding.owner);
        return err!(TokenGuardError::InvalidMembershipEvidence);
    }

    if holding.amount < MIN_MEMBERSHIP_BALANCE {
        msg!("Membership token balance is {}", holding.amount);
        return err!(TokenGuardError::InvalidMembershipEvidence);
    }

    Ok(())
}

fn check_descriptor(descriptor: &Descriptor, mint: &Pubkey) -> Result<()> {
    require_keys_eq!(
        descriptor.mint,
        *mint,
        TokenGuardError::InvalidMembershipEvidence
    );

    // Must be the canonical metadata PDA for the mint
    require_keys_eq!(
        descriptor.address,
        derive_metadata_address(mint),
        TokenGuardError::InvalidMembershipEvidence
    );

    Ok(())
}
