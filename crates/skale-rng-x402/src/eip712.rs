//! EIP-712 helpers for EIP-3009 `TransferWithAuthorization` payment proofs.
//!
//! - Domains are per token: name/version from the token, chain ID, and the
//!   token contract as verifying contract ([`token_domain`])
//! - [`authorization_from_wire`] turns the decimal-string wire form back into the typed struct
//! - [`recover_signer`] rejects high-s signatures (EIP-2) before recovery

use std::borrow::Cow;

use alloy::primitives::{Address, FixedBytes, Signature, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};

use crate::payment::ExactEvmAuthorization;
use crate::{TransferWithAuthorization, X402Error};

/// Build the EIP-712 domain of a payment token.
pub fn token_domain(name: &str, version: &str, chain_id: u64, token: Address) -> Eip712Domain {
    Eip712Domain {
        name: Some(Cow::Owned(name.to_string())),
        version: Some(Cow::Owned(version.to_string())),
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(token),
        salt: None,
    }
}

pub fn signing_hash(auth: &TransferWithAuthorization, domain: &Eip712Domain) -> B256 {
    auth.eip712_signing_hash(domain)
}

fn parse_u256(field: &str, value: &str) -> Result<U256, X402Error> {
    value
        .parse::<U256>()
        .map_err(|e| X402Error::InvalidPayment(format!("invalid {field} '{value}': {e}")))
}

/// Parse the wire authorization into the struct that gets hashed.
pub fn authorization_from_wire(
    auth: &ExactEvmAuthorization,
) -> Result<TransferWithAuthorization, X402Error> {
    Ok(TransferWithAuthorization {
        from: auth.from,
        to: auth.to,
        value: parse_u256("value", &auth.value)?,
        validAfter: parse_u256("validAfter", &auth.valid_after)?,
        validBefore: parse_u256("validBefore", &auth.valid_before)?,
        nonce: auth.nonce,
    })
}

/// secp256k1 curve order N / 2. Signatures with s above this are malleable (EIP-2).
const SECP256K1_N_DIV_2: U256 = U256::from_limbs([
    0xDFE92F46681B20A0,
    0x5D576E7357A4501D,
    0xFFFFFFFFFFFFFFFF,
    0x7FFFFFFFFFFFFFFF,
]);

/// Recover the address that signed `auth` under `domain`.
pub fn recover_signer(
    auth: &TransferWithAuthorization,
    signature_hex: &str,
    domain: &Eip712Domain,
) -> Result<Address, X402Error> {
    let bytes = alloy::hex::decode(signature_hex)
        .map_err(|e| X402Error::SignatureError(format!("invalid signature hex: {e}")))?;
    if bytes.len() != 65 {
        return Err(X402Error::SignatureError(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }

    let sig = Signature::from_raw(&bytes)
        .map_err(|e| X402Error::SignatureError(format!("invalid signature: {e}")))?;
    if sig.s() > SECP256K1_N_DIV_2 {
        return Err(X402Error::SignatureError(
            "high-s signature rejected".to_string(),
        ));
    }

    sig.recover_address_from_prehash(&signing_hash(auth, domain))
        .map_err(|e| X402Error::SignatureError(format!("recovery failed: {e}")))
}

/// Random 32-byte authorization nonce from the OS CSPRNG.
pub fn random_nonce() -> FixedBytes<32> {
    let mut bytes = [0u8; 32];
    rand::fill(&mut bytes);
    FixedBytes::from(bytes)
}

/// Encode a signature as 0x-prefixed hex (65 bytes, v = 27/28).
pub fn encode_signature_hex(sig: &Signature) -> String {
    format!("0x{}", alloy::hex::encode(sig.as_bytes()))
}
