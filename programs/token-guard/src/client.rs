//! Off-chain assembly of token guard transactions.
//!
//! A new token guard is created in one transaction together with its output mint, whose
//! mint and freeze authority are the guard's derived mint authority.
//!
//! A requester exchanges through an ephemeral associated token account: it is created
//! before the exchange, receives the minted tokens, is drained by the caller's own
//! instructions and is closed again, all in one transaction.

use anchor_lang::{
    prelude::*,
    solana_program::{
        instruction::{AccountMeta, Instruction},
        system_instruction,
    },
    system_program, AccountDeserialize, InstructionData, ToAccountMetas,
};
use anchor_spl::{
    associated_token::{
        get_associated_token_address_with_program_id,
        spl_associated_token_account::instruction::create_associated_token_account_idempotent,
    },
    token_interface::TokenAccount,
};
use spl_token_2022::{
    extension::ExtensionType,
    instruction::{close_account, initialize_mint2},
    pod::PodMint,
};

use crate::{
    constants::OUT_MINT_DECIMALS,
    errors::TokenGuardError,
    membership::evidence_account_keys,
    state::{MembershipRequirement, TokenGuard},
    utils::{derive_allowance_account, derive_event_authority, derive_mint_authority},
};

/// Raw account contents as returned by an RPC node
#[derive(Clone, Debug)]
pub struct FetchedAccount {
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// Read access to on-chain accounts
pub trait AccountSource {
    fn fetch(&self, address: &Pubkey) -> Option<FetchedAccount>;
}

fn fetch_account(source: &impl AccountSource, address: &Pubkey) -> Result<FetchedAccount> {
    source.fetch(address).ok_or_else(|| {
        msg!("Account {} not found", address);
        error!(ErrorCode::AccountNotInitialized)
    })
}

/// A decoded token guard and the addresses derived from it
#[derive(Clone, Debug)]
pub struct TokenGuardState {
    pub address: Pubkey,
    pub token_guard: TokenGuard,
    pub mint_authority: Pubkey,
}

impl TokenGuardState {
    pub fn fetch(
        source: &impl AccountSource,
        program_id: &Pubkey,
        address: &Pubkey,
    ) -> Result<Self> {
        let account = fetch_account(source, address)?;
        require_keys_eq!(
            account.owner,
            *program_id,
            ErrorCode::AccountOwnedByWrongProgram
        );
        let token_guard = TokenGuard::try_deserialize(&mut account.data.as_slice())?;
        let (mint_authority, _) = derive_mint_authority(address, program_id);

        Ok(Self {
            address: *address,
            token_guard,
            mint_authority,
        })
    }
}

/// The optional gates of a new token guard
#[derive(Clone, Copy, Debug, Default)]
pub struct GuardSettings {
    pub gatekeeper_network: Option<Pubkey>,
    pub start_time: Option<i64>,
    pub allowance: Option<u32>,
    pub max_amount: Option<u64>,
    pub membership: Option<MembershipRequirement>,
}

/// The instructions creating a token guard and its output mint, in execution order.
/// The transaction must be signed by the fee payer, the authority, the new token guard
/// and the new mint.
#[derive(Clone, Debug)]
pub struct InitializeBundle {
    pub create_mint: Instruction,
    pub initialize_mint: Instruction,
    pub initialize: Instruction,
    pub token_guard: Pubkey,
    pub out_mint: Pubkey,
    pub mint_authority: Pubkey,
}

impl InitializeBundle {
    pub fn instructions(self) -> Vec<Instruction> {
        vec![self.create_mint, self.initialize_mint, self.initialize]
    }
}

/// The instructions of one exchange, in the order they must execute
#[derive(Clone, Debug)]
pub struct ExchangeBundle {
    /// Creates the requester's receiving token account if it does not exist
    pub setup: Instruction,
    pub exchange: Instruction,
    /// Closes the receiving token account back to the requester
    pub teardown: Instruction,
    pub payer_token_account: Pubkey,
    pub allowance_principal: Pubkey,
    pub allowance_account: Pubkey,
}

impl ExchangeBundle {
    /// Orders the bundle around the caller's `consumers`, which spend the minted tokens.
    /// The receiving account only closes once emptied, so without consumers there is no
    /// teardown and the minted tokens stay in the requester's associated token account.
    pub fn instructions(self, consumers: Vec<Instruction>) -> Vec<Instruction> {
        let teardown = (!consumers.is_empty()).then_some(self.teardown);

        [self.setup, self.exchange]
            .into_iter()
            .chain(consumers)
            .chain(teardown)
            .collect()
    }
}

/// Builds exchange bundles for one program deployment
pub struct RequestAssembler<'a, S: AccountSource> {
    source: &'a S,
    program_id: Pubkey,
    fee_payer: Pubkey,
}

impl<'a, S: AccountSource> RequestAssembler<'a, S> {
    /// * `source` - Where token guard, mint and membership accounts are read from.
    /// * `program_id` - The deployed token guard program.
    /// * `fee_payer` - Pays for creating output mints and receiving token accounts.
    pub fn new(source: &'a S, program_id: Pubkey, fee_payer: Pubkey) -> Self {
        Self {
            source,
            program_id,
            fee_payer,
        }
    }

    /// Assemble the instructions creating a token guard and a fresh output mint for it.
    /// # Arguments
    /// * `authority` - Creates the token guard and pays for it. Must sign.
    /// * `token_guard` - The new token guard's address. Its keypair must sign.
    /// * `out_mint` - The new output mint's address. Its keypair must sign.
    /// * `token_program` - The token program that will own the output mint.
    /// * `recipient` - Receives the SOL paid on every exchange.
    /// * `settings` - The guard's optional gates.
    /// # Returns
    /// * `Result<InitializeBundle>` - The create-mint, init-mint and initialize instructions.
    pub fn build_initialize(
        &self,
        authority: &Pubkey,
        token_guard: &Pubkey,
        out_mint: &Pubkey,
        token_program: &Pubkey,
        recipient: &Pubkey,
        settings: GuardSettings,
    ) -> Result<InitializeBundle> {
        let (mint_authority, _) = derive_mint_authority(token_guard, &self.program_id);

        let space = ExtensionType::try_calculate_account_len::<PodMint>(&[])?;
        let create_mint = system_instruction::create_account(
            &self.fee_payer,
            out_mint,
            Rent::default().minimum_balance(space),
            space as u64,
            token_program,
        );
        let initialize_mint = initialize_mint2(
            token_program,
            out_mint,
            &mint_authority,
            Some(&mint_authority),
            OUT_MINT_DECIMALS,
        )?;

        let initialize = Instruction {
            program_id: self.program_id,
            accounts: crate::accounts::Initialize {
                token_guard: *token_guard,
                authority: *authority,
                out_mint: *out_mint,
                mint_authority,
                recipient: *recipient,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: crate::instruction::Initialize {
                gatekeeper_network: settings.gatekeeper_network,
                start_time: settings.start_time,
                allowance: settings.allowance,
                max_amount: settings.max_amount,
                membership: settings.membership,
            }
            .data(),
        };

        Ok(InitializeBundle {
            create_mint,
            initialize_mint,
            initialize,
            token_guard: *token_guard,
            out_mint: *out_mint,
            mint_authority,
        })
    }

    /// Assemble the instructions for `requester` to exchange `lamports` through `token_guard`.
    /// # Arguments
    /// * `token_guard` - The token guard address.
    /// * `requester` - Pays the lamports and receives the output tokens. Must sign.
    /// * `lamports` - The amount to exchange.
    /// * `gateway_token` - The requester's gateway token, if the guard needs one.
    /// * `membership_holding` - The requester's membership token account, if the guard needs one.
    /// # Returns
    /// * `Result<ExchangeBundle>` - The setup, exchange and teardown instructions.
    pub fn build_exchange(
        &self,
        token_guard: &Pubkey,
        requester: &Pubkey,
        lamports: u64,
        gateway_token: Option<Pubkey>,
        membership_holding: Option<Pubkey>,
    ) -> Result<ExchangeBundle> {
        let state = TokenGuardState::fetch(self.source, &self.program_id, token_guard)?;
        let guard = &state.token_guard;
        let token_program = fetch_account(self.source, &guard.out_mint)?.owner;
        let payer_token_account = get_associated_token_address_with_program_id(
            requester,
            &guard.out_mint,
            &token_program,
        );

        let mut allowance_principal = *requester;
        let mut remaining_accounts = Vec::new();
        if let Some(requirement) = guard.membership {
            let holding = membership_holding.ok_or(TokenGuardError::MissingMembershipEvidence)?;
            let holding_mint = self.holding_mint(&holding)?;
            if requirement.strategy.is_nft() {
                allowance_principal = holding_mint;
            }
            remaining_accounts =
                evidence_account_keys(requirement.strategy, holding, holding_mint)
                    .into_iter()
                    .map(|key| AccountMeta::new_readonly(key, false))
                    .collect();
        }
        let (allowance_account, _) =
            derive_allowance_account(token_guard, &allowance_principal, &self.program_id);

        let mut accounts = crate::accounts::Exchange {
            payer: *requester,
            token_guard: *token_guard,
            out_mint: guard.out_mint,
            mint_authority: state.mint_authority,
            payer_token_account,
            recipient: guard.recipient,
            gateway_token,
            allowance_account,
            token_program,
            system_program: system_program::ID,
            event_authority: derive_event_authority(&self.program_id),
            program: self.program_id,
        }
        .to_account_metas(None);
        accounts.extend(remaining_accounts);

        let exchange = Instruction {
            program_id: self.program_id,
            accounts,
            data: crate::instruction::Exchange {
                lamports,
                allowance_principal,
            }
            .data(),
        };

        Ok(ExchangeBundle {
            setup: create_associated_token_account_idempotent(
                &self.fee_payer,
                requester,
                &guard.out_mint,
                &token_program,
            ),
            exchange,
            teardown: close_account(
                &token_program,
                &payer_token_account,
                requester,
                requester,
                &[],
            )?,
            payer_token_account,
            allowance_principal,
            allowance_account,
        })
    }

    fn holding_mint(&self, holding: &Pubkey) -> Result<Pubkey> {
        let account = fetch_account(self.source, holding)?;
        let token_account = TokenAccount::try_deserialize(&mut account.data.as_slice())
            .map_err(|_| error!(TokenGuardError::InvalidMembershipEvidence))?;
        Ok(token_account.mint)
    }
}
