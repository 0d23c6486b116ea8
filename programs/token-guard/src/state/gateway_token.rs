use anchor_lang::prelude::*;

use crate::{constants::GATEWAY_PROGRAM_ID, errors::TokenGuardError};

/// Lifecycle state of a gateway token, as stored by the gateway program
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum GatewayTokenState {
    Active,
    Frozen,
    Revoked,
}

/// Gateway token account - a credential issued by a gatekeeper in a gatekeeper network.
/// Owned and written by the external gateway program; this program only reads it.
#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct GatewayToken {
    // Layout version
    pub version: u8,

    // Set if this token was derived from another gateway token
    pub parent_gateway_token: Option<Pubkey>,

    // The wallet the token was issued to
    pub owner_wallet: Pubkey,

    // Identity account of the owner, if any
    pub owner_identity: Option<Pubkey>,

    // The network the issuing gatekeeper belongs to
    pub gatekeeper_network: Pubkey,

    // The gatekeeper that issued the token
    pub issuing_gatekeeper: Pubkey,

    // Only active tokens are valid
    pub state: GatewayTokenState,

    // If set, the token is invalid from this unix timestamp on
    pub expire_time: Option<i64>,
}

impl GatewayToken {
    /// Reads a gateway token from an account owned by the gateway program.
    /// Any account that is not a well-formed gateway token yields `NoValidCredential`.
    pub fn from_account_info(account: &AccountInfo) -> Result<Self> {
        if *account.owner != GATEWAY_PROGRAM_ID {
            msg!("Gateway token {} has wrong owner {}", account.key(), account.owner);
            return err!(TokenGuardError::NoValidCredential);
        }

        let data = account.try_borrow_data()?;
        Self::deserialize(&mut &data[..]).map_err(|_| {
            msg!("Gateway token {} could not be parsed", account.key());
            error!(TokenGuardError::NoValidCredential)
        })
    }

    /// Checks that the token is a currently valid credential for `wallet` on `network`
    pub fn verify(&self, wallet: &Pubkey, network: &Pubkey, now: i64) -> Result<()> {
        require_keys_eq!(
            self.owner_wallet,
            *wallet,
            TokenGuardError::NoValidCredential
        );
        require_keys_eq!(
            self.gatekeeper_network,
            *network,
            TokenGuardError::NoValidCredential
        );

        if self.state != GatewayTokenState::Active {
            msg!("Gateway token is {:?}", self.state);
            return err!(TokenGuardError::NoValidCredential);
        }

        if let Some(expire_time) = self.expire_time {
            if now >= expire_time {
                msg!("Gateway token expired at {}", expire_time);
                return err!(TokenGuardError::NoValidCredential);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::error_code, utils::test_accounts::TestAccount};

    fn no_credential() -> Option<u32> {
        Some(TokenGuardError::NoValidCredential.into())
    }

    fn active_token(wallet: Pubkey, network: Pubkey) -> GatewayToken {
        GatewayToken {
            version: 0,
            parent_gateway_token: None,
            owner_wallet: wallet,
            owner_identity: None,
            gatekeeper_network: network,
            issuing_gatekeeper: Pubkey::new_unique(),
            state: GatewayTokenState::Active,
            expire_time: None,
        }
    }

    #[test]
    fn test_active_token_is_valid() {
        let wallet = Pubkey::new_unique();
        let network = Pubkey::new_unique();
        assert!(active_token(wallet, network).verify(&wallet, &network, 0).is_ok());
    }

    #[test]
    fn test_token_for_other_wallet_is_invalid() {
        let network = Pubkey::new_unique();
        let token = active_token(Pubkey::new_unique(), network);
        assert!(token.verify(&Pubkey::new_unique(), &network, 0).is_err());
    }

    #[test]
    fn test_token_on_other_network_is_invalid() {
        let wallet = Pubkey::new_unique();
        let token = active_token(wallet, Pubkey::new_unique());
        assert!(token.verify(&wallet, &Pubkey::new_unique(), 0).is_err());
    }

    #[test]
    fn test_revoked_and_frozen_tokens_are_invalid() {
        let wallet = Pubkey::new_unique();
        let network = Pubkey::new_unique();

        for state in [GatewayTokenState::Revoked, GatewayTokenState::Frozen] {
            let token = GatewayToken {
                state,
                ..active_token(wallet, network)
            };
            assert!(token.verify(&wallet, &network, 0).is_err());
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let wallet = Pubkey::new_unique();
        let network = Pubkey::new_unique();
        let token = GatewayToken {
            expire_time: Some(100),
            ..active_token(wallet, network)
        };

        assert!(token.verify(&wallet, &network, 99).is_ok());
        assert!(token.verify(&wallet, &network, 100).is_err());
    }

    #[test]
    fn test_parses_gateway_program_layout_with_trailing_bytes() {
        let wallet = Pubkey::new_unique();
        let network = Pubkey::new_unique();
        let token = active_token(wallet, network);

        let mut data = Vec::new();
        token.serialize(&mut data).unwrap();
        data.extend_from_slice(&[0u8; 16]);

        let parsed = GatewayToken::deserialize(&mut &data[..]).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_reads_account_owned_by_gateway_program() {
        let token = active_token(Pubkey::new_unique(), Pubkey::new_unique());
        let mut data = Vec::new();
        token.serialize(&mut data).unwrap();
        let mut account = TestAccount::new(GATEWAY_PROGRAM_ID, data);

        assert_eq!(GatewayToken::from_account_info(&account.info()).unwrap(), token);
    }

    #[test]
    fn test_account_with_wrong_owner_is_no_credential() {
        let token = active_token(Pubkey::new_unique(), Pubkey::new_unique());
        let mut data = Vec::new();
        token.serialize(&mut data).unwrap();
        let mut account = TestAccount::new(Pubkey::new_unique(), data);

        assert_eq!(
            error_code(GatewayToken::from_account_info(&account.info())),
            no_credential()
        );
    }

    #[test]
    fn test_unparsable_account_is_no_credential() {
        let mut account = TestAccount::new(GATEWAY_PROGRAM_ID, vec![0; 5]);

        assert_eq!(
            error_code(GatewayToken::from_account_info(&account.info())),
            no_credential()
        );
    }
}
