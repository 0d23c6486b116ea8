use anchor_lang::{prelude::*, Id};
use anchor_spl::metadata::Metadata;

use crate::constants::{ALLOWANCE_ACCOUNT_SEED, METADATA_SEED, MINT_AUTHORITY_SEED};

/// Seed anchor uses for the `#[event_cpi]` authority PDA
const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

/// Derives the PDA allowed to mint a token guard's output token.
/// Anyone can re-derive it from the token guard address; only this program can sign for it.
/// # Arguments
/// * `token_guard` - The token guard address.
/// * `program_id` - The token guard program id.
/// # Returns
/// * `(Pubkey, u8)` - The mint authority address and its bump.
pub fn derive_mint_authority(token_guard: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MINT_AUTHORITY_SEED, token_guard.as_ref()], program_id)
}

/// Derives the allowance account tracking `principal`'s exchanges under `token_guard`
/// # Arguments
/// * `token_guard` - The token guard address.
/// * `principal` - The wallet or membership NFT mint the allowance is charged to.
/// * `program_id` - The token guard program id.
/// # Returns
/// * `(Pubkey, u8)` - The allowance account address and its bump.
pub fn derive_allowance_account(
    token_guard: &Pubkey,
    principal: &Pubkey,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            ALLOWANCE_ACCOUNT_SEED,
            token_guard.as_ref(),
            principal.as_ref(),
        ],
        program_id,
    )
}

/// Derives the canonical token metadata address for `mint`
pub fn derive_metadata_address(mint: &Pubkey) -> Pubkey {
    let metadata_program = Metadata::id();
    Pubkey::find_program_address(
        &[METADATA_SEED, metadata_program.as_ref(), mint.as_ref()],
        &metadata_program,
    )
    .0
}

/// Derives the event authority used by `emit_cpi!`
pub fn derive_event_authority(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[EVENT_AUTHORITY_SEED], program_id).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_authority_is_deterministic_and_per_guard() {
        let program_id = crate::ID;
        let guard_a = Pubkey::new_unique();
        let guard_b = Pubkey::new_unique();

        assert_eq!(
            derive_mint_authority(&guard_a, &program_id),
            derive_mint_authority(&guard_a, &program_id)
        );
        assert_ne!(
            derive_mint_authority(&guard_a, &program_id).0,
            derive_mint_authority(&guard_b, &program_id).0
        );
    }

    #[test]
    fn test_mint_authority_is_off_curve() {
        let (authority, _) = derive_mint_authority(&Pubkey::new_unique(), &crate::ID);
        assert!(!authority.is_on_curve());
    }

    #[test]
    fn test_allowance_account_differs_per_principal_and_guard() {
        let program_id = crate::ID;
        let guard = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();
        let nft = Pubkey::new_unique();

        let (wallet_account, _) = derive_allowance_account(&guard, &wallet, &program_id);
        let (nft_account, _) = derive_allowance_account(&guard, &nft, &program_id);
        let (other_guard_account, _) =
            derive_allowance_account(&Pubkey::new_unique(), &wallet, &program_id);

        assert_ne!(wallet_account, nft_account);
        assert_ne!(wallet_account, other_guard_account);
    }

    #[test]
    fn test_mint_authority_and_allowance_do_not_collide() {
        let program_id = crate::ID;
        let guard = Pubkey::new_unique();

        let (authority, _) = derive_mint_authority(&guard, &program_id);
        let (allowance, _) = derive_allowance_account(&guard, &guard, &program_id);
        assert_ne!(authority, allowance);
    }

    #[test]
    fn test_metadata_address_matches_metadata_program_seeds() {
        let mint = Pubkey::new_unique();
        let (expected, _) = Pubkey::find_program_address(
            &[b"metadata", Metadata::id().as_ref(), mint.as_ref()],
            &Metadata::id(),
        );
        assert_eq!(derive_metadata_address(&mint), expected);
    }
}
