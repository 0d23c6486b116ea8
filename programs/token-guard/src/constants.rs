use anchor_lang::prelude::*;

// PDA SEEDS

/// Seed for the out-mint authority PDA
/// Derived per token guard, so each guard mints only its own output token
pub const MINT_AUTHORITY_SEED: &[u8] = b"token_guard_out_mint_authority";
/// Seed for AllowanceAccount PDA
pub const ALLOWANCE_ACCOUNT_SEED: &[u8] = b"token_guard_allowance_account";
/// Seed used by the token metadata program for its metadata PDAs
pub const METADATA_SEED: &[u8] = b"metadata";

// EXTERNAL PROGRAMS

/// The identity gateway program that issues and owns gateway tokens
pub const GATEWAY_PROGRAM_ID: Pubkey = pubkey!("gatem74V238djXdzWnJf94Wo1DcnuGkfijbf3AuBhfs");

// MEMBERSHIP EVIDENCE LAYOUT

/// Number of remaining accounts carrying SPL balance evidence: [holding]
pub const SPL_EVIDENCE_ACCOUNTS: usize = 1;
/// Number of remaining accounts carrying NFT evidence: [holding, mint, metadata]
pub const NFT_EVIDENCE_ACCOUNTS: usize = 3;

/// Minimum token balance a membership holding must carry
pub const MIN_MEMBERSHIP_BALANCE: u64 = 1;

// CLIENT

/// Decimals of output mints created by the client, matching SOL
pub const OUT_MINT_DECIMALS: u8 = 9;
