//! Form state: the free-text fields the user edits.

use chain_sol::Pubkey;

use crate::error::PageError;

/// Raw input, exactly as typed. Nothing is validated until a handler runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenForm {
    pub transfer_amount: String,
    pub recipient: String,
    pub mint_amount: String,
    pub burn_amount: String,
    pub delegate_address: String,
}

/// The trimmed value of a required field, or `MissingField`.
pub(crate) fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, PageError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PageError::MissingField(field));
    }
    Ok(value)
}

/// A positive amount in base units.
pub(crate) fn parse_amount(field: &'static str, value: &str) -> Result<u64, PageError> {
    let amount = value.parse::<u64>().map_err(|e| PageError::InvalidAmount {
        field,
        reason: format!("{value:?}: {e}"),
    })?;
    if amount == 0 {
        return Err(PageError::InvalidAmount {
            field,
            reason: "amount must be greater than zero".into(),
        });
    }
    Ok(amount)
}

/// A wallet address: valid Base58, 32 bytes, and on the ed25519 curve.
pub(crate) fn parse_wallet_address(field: &'static str, value: &str) -> Result<Pubkey, PageError> {
    let pubkey = value
        .parse::<Pubkey>()
        .map_err(|e| PageError::InvalidAddress {
            field,
            reason: e.to_string(),
        })?;
    if !pubkey.is_on_curve() {
        return Err(PageError::OffCurve(field));
    }
    Ok(pubkey)
}
