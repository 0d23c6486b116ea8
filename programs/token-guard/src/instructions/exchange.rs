use anchor_lang::{
    prelude::*,
    solana_program::{program::invoke, system_instruction},
};
use anchor_spl::token_interface::{mint_to, Mint, MintTo, TokenAccount, TokenInterface};

use crate::{
    constants::{ALLOWANCE_ACCOUNT_SEED, MINT_AUTHORITY_SEED},
    errors::TokenGuardError,
    membership::MembershipEvidence,
    state::{AllowanceAccount, GatewayToken, MembershipRequirement, TokenGuard},
    utils::{run_gates, Accepted, EvidenceSource, ExchangeRequest},
};

/// Pay SOL to the guard's recipient and receive the same amount of the guard's output token.
/// Membership evidence, if the guard requires it, is passed in the remaining accounts.
#[event_cpi]
#[derive(Accounts)]
#[instruction(lamports: u64, allowance_principal: Pubkey)]
pub struct Exchange<'info> {
    /// The requester. Pays the exchange amount and for the allowance account if needed.
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The token guard being exchanged through
    #[account(
        has_one = recipient,
        has_one = out_mint,
    )]
    pub token_guard: Box<Account<'info, TokenGuard>>,

    /// The guard's output mint
    #[account(
        mut,
        mint::authority = mint_authority,
        mint::token_program = token_program,
    )]
    pub out_mint: Box<InterfaceAccount<'info, Mint>>,

    /// The token guard's mint authority PDA
    /// # PDA Seeds
    /// - MINT_AUTHORITY_SEED
    /// - The token guard's address
    /// CHECK: Holds no data, only signs the mint instruction.
    #[account(
        seeds = [MINT_AUTHORITY_SEED, token_guard.key().as_ref()],
        bump = token_guard.mint_authority_bump,
    )]
    pub mint_authority: UncheckedAccount<'info>,

    /// The requester's token account receiving the minted tokens
    #[account(
        mut,
        token::mint = out_mint,
        token::authority = payer,
        token::token_program = token_program,
    )]
    pub payer_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Checked against the token guard's recipient.
    #[account(mut)]
    pub recipient: UncheckedAccount<'info>,

    /// The requester's gateway token, required if the guard sets a gatekeeper network
    /// CHECK: Parsed and verified by the credential gate.
    pub gateway_token: Option<UncheckedAccount<'info>>,

    /// The allowance account tracking exchanges charged to `allowance_principal`
    /// # PDA Seeds
    /// - ALLOWANCE_ACCOUNT_SEED
    /// - The token guard's address
    /// - The principal: the membership NFT's mint for NFT strategies, otherwise the requester
    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + AllowanceAccount::INIT_SPACE,
        seeds = [
            ALLOWANCE_ACCOUNT_SEED,
            token_guard.key().as_ref(),
            allowance_principal.as_ref(),
        ],
        bump,
    )]
    pub allowance_account: Box<Account<'info, AllowanceAccount>>,

    /// The token program of the output mint
    pub token_program: Interface<'info, TokenInterface>,

    /// The system program
    pub system_program: Program<'info, System>,
}

/// Evidence read from the accounts passed to the exchange instruction
pub struct AccountEvidence<'a, 'info> {
    pub gateway_token: Option<&'a AccountInfo<'info>>,
    pub remaining_accounts: &'a [AccountInfo<'info>],
}

impl EvidenceSource for AccountEvidence<'_, '_> {
    fn credential(&self) -> Result<Option<GatewayToken>> {
        self.gateway_token
            .map(GatewayToken::from_account_info)
            .transpose()
    }

    fn membership(
        &self,
        requirement: Option<&MembershipRequirement>,
    ) -> Result<Option<MembershipEvidence>> {
        MembershipEvidence::resolve(requirement, self.remaining_accounts)
    }
}

impl<'info> Exchange<'info> {
    /// Run the exchange gates, then move the SOL and mint the output tokens.
    /// # Arguments
    /// * `lamports` - The amount paid, and the amount of output tokens minted.
    /// * `allowance_principal` - The principal the allowance account was derived from.
    /// * `remaining_accounts` - Membership evidence, in the order the guard's strategy expects.
    /// * `bumps` - Bumps for PDA derivation.
    /// # Returns
    /// * `Result<Accepted>` - The charged principal and its new exchange count.
    pub fn exchange(
        &mut self,
        lamports: u64,
        allowance_principal: Pubkey,
        remaining_accounts: &[AccountInfo<'info>],
        bumps: &ExchangeBumps,
    ) -> Result<Accepted> {
        let request = ExchangeRequest {
            token_guard: self.token_guard.key(),
            requester: self.payer.key(),
            lamports,
            now: Clock::get()?.unix_timestamp,
        };
        let evidence = AccountEvidence {
            gateway_token: self.gateway_token.as_ref().map(|account| &**account),
            remaining_accounts,
        };

        let accepted = run_gates(
            &self.token_guard,
            &request,
            &evidence,
            allowance_principal,
            &mut self.allowance_account,
            bumps.allowance_account,
        )?;
        msg!(
            "Exchange {} of {} charged to {}",
            accepted.count,
            lamports,
            accepted.principal
        );

        self.pay(lamports)?;
        self.mint(lamports)?;

        Ok(accepted)
    }

    fn pay(&self, lamports: u64) -> Result<()> {
        require_gte!(
            self.payer.lamports(),
            lamports,
            TokenGuardError::InsufficientFunds
        );

        invoke(
            &system_instruction::transfer(&self.payer.key(), &self.recipient.key(), lamports),
            &[
                self.payer.to_account_info(),
                self.recipient.to_account_info(),
                self.system_program.to_account_info(),
            ],
        )?;

        Ok(())
    }

    fn mint(&self, amount: u64) -> Result<()> {
        let token_guard = self.token_guard.key();

        mint_to(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                MintTo {
                    mint: self.out_mint.to_account_info(),
                    to: self.payer_token_account.to_account_info(),
                    authority: self.mint_authority.to_account_info(),
                },
                &[&[
                    MINT_AUTHORITY_SEED,
                    token_guard.as_ref(),
                    &[self.token_guard.mint_authority_bump],
                ]],
            ),
            amount,
        )
    }
}
