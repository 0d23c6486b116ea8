use anchor_lang::prelude::*;

use crate::{
    errors::TokenGuardError,
    membership::MembershipEvidence,
    state::{AllowanceAccount, GatewayToken, MembershipRequirement, TokenGuard},
};

/// A single exchange request against a token guard
#[derive(Clone, Copy, Debug)]
pub struct ExchangeRequest {
    pub token_guard: Pubkey,
    pub requester: Pubkey,
    pub lamports: u64,
    pub now: i64,
}

/// Supplies the credential and membership evidence presented with a request.
/// Both are loaded lazily, so an earlier gate rejects before later evidence is parsed.
pub trait EvidenceSource {
    /// The gateway token presented with the request, if any
    fn credential(&self) -> Result<Option<GatewayToken>>;

    /// The membership evidence `requirement` calls for, if any
    fn membership(
        &self,
        requirement: Option<&MembershipRequirement>,
    ) -> Result<Option<MembershipEvidence>>;
}

/// Outcome of a request that passed every gate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accepted {
    pub principal: Pubkey,
    pub count: u32,
}

/// Runs the exchange gates in order: time, credential, membership, amount, allowance.
/// Only the allowance gate writes state, and only as its last step.
/// # Arguments
/// * `guard` - The token guard configuration.
/// * `request` - The exchange request.
/// * `sources` - Supplies the presented credential and membership evidence.
/// * `ledger_principal` - The principal the `ledger` account address was derived from.
/// * `ledger` - The allowance account for `ledger_principal`, possibly freshly created.
/// * `ledger_bump` - The bump of the allowance account PDA.
/// # Returns
/// * `Result<Accepted>` - The charged principal and its new count if every gate passed.
pub fn run_gates(
    guard: &TokenGuard,
    request: &ExchangeRequest,
    sources: &impl EvidenceSource,
    ledger_principal: Pubkey,
    ledger: &mut AllowanceAccount,
    ledger_bump: u8,
) -> Result<Accepted> {
    // 1. Time gate
    guard.check_start_time(request.now)?;

    // 2. Credential gate
    if let Some(network) = guard.gatekeeper_network {
        msg!("Verifying gateway token on network {}", network);
        let credential = sources
            .credential()?
            .ok_or(TokenGuardError::NoValidCredential)?;
        credential.verify(&request.requester, &network, request.now)?;
        msg!("Gateway token verified");
    }

    // 3. Membership gate
    let evidence = sources.membership(guard.membership.as_ref())?;
    if let Some(requirement) = guard.membership.as_ref() {
        msg!("Checking membership token with strategy {:?}", requirement.strategy);
        evidence
            .as_ref()
            .ok_or(TokenGuardError::MissingMembershipEvidence)?
            .verify(requirement, &request.requester)?;
    }

    // 4. Amount gate
    require_gt!(request.lamports, 0, TokenGuardError::InvalidAmount);
    guard.check_max_amount(request.lamports)?;

    // 5. Allowance gate
    let principal = guard.allowance_principal(&request.requester, evidence.as_ref());
    require_keys_eq!(
        principal,
        ledger_principal,
        TokenGuardError::AllowancePrincipalMismatch
    );
    ledger.initialize_if_needed(request.token_guard, principal, ledger_bump)?;
    let count = ledger.check_and_increment(guard.allowance)?;

    Ok(Accepted { principal, count })
}
