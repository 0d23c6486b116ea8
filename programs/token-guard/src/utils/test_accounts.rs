use anchor_lang::prelude::*;

/// An account owned by the test, lent out as an `AccountInfo`
pub(crate) struct TestAccount {
    pub key: Pubkey,
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
}

impl TestAccount {
    pub fn new(owner: Pubkey, data: Vec<u8>) -> Self {
        Self {
            key: Pubkey::new_unique(),
            owner,
            lamports: 1_000_000,
            data,
        }
    }

    pub fn info(&mut self) -> AccountInfo<'_> {
        AccountInfo::new(
            &self.key,
            false,
            false,
            &mut self.lamports,
            &mut self.data[..],
            &self.owner,
            false,
            0,
        )
    }
}

/// SPL token account layout: mint, owner, amount, then optional fields left empty
pub(crate) fn token_account_data(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(165);
    data.extend_from_slice(mint.as_ref());
    data.extend_from_slice(owner.as_ref());
    data.extend_from_slice(&amount.to_le_bytes());
    data.extend_from_slice(&[0; 36]); // delegate
    data.push(1); // initialized
    data.extend_from_slice(&[0; 12]); // is_native
    data.extend_from_slice(&[0; 8]); // delegated_amount
    data.extend_from_slice(&[0; 36]); // close_authority
    data
}
