//! Card credentials: PIN, PUK and pairing password
//!
//! The initialize flow needs three secrets collected from the user (or
//! generated) before a session is started. Validation happens at
//! construction time so a `Credentials` value is always well-formed.

use base64::prelude::*;
use rand::{Rng, RngCore};
use thiserror::Error;

const PIN_LENGTH: usize = 6;
const PUK_LENGTH: usize = 12;
const MAX_PIN_NUMBER: u64 = 999_999;
const MAX_PUK_NUMBER: u64 = 999_999_999_999;

/// Error type for credential validation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    /// The input was not the expected length
    #[error("Input has incorrect length: expected {expected}, got {actual}")]
    IncorrectLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// The input contained non-digit characters
    #[error("Input contains invalid characters")]
    InvalidCharacters,

    /// The pairing password was empty
    #[error("Pairing password must not be empty")]
    EmptyPairingPassword,
}

/// Validates a PIN: exactly 6 ASCII digits
pub fn validate_pin(pin: &str) -> Result<(), CredentialsError> {
    if pin.len() != PIN_LENGTH {
        return Err(CredentialsError::IncorrectLength {
            expected: PIN_LENGTH,
            actual: pin.len(),
        });
    }
    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(CredentialsError::InvalidCharacters);
    }
    Ok(())
}

/// Validates a PUK: exactly 12 ASCII digits
pub fn validate_puk(puk: &str) -> Result<(), CredentialsError> {
    if puk.len() != PUK_LENGTH {
        return Err(CredentialsError::IncorrectLength {
            expected: PUK_LENGTH,
            actual: puk.len(),
        });
    }
    if !puk.chars().all(|c| c.is_ascii_digit()) {
        return Err(CredentialsError::InvalidCharacters);
    }
    Ok(())
}

/// Validates a pairing password: any non-empty string
pub fn validate_pairing_pass(pairing_pass: &str) -> Result<(), CredentialsError> {
    if pairing_pass.is_empty() {
        return Err(CredentialsError::EmptyPairingPassword);
    }
    Ok(())
}

/// The secret data needed to initialize a card
#[derive(Debug, Clone)]
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub struct Credentials {
    pin: String,
    puk: String,
    pairing_pass: String,
}

impl Credentials {
    /// Creates credentials from the provided PIN, PUK and pairing password
    pub fn new(pin: &str, puk: &str, pairing_pass: &str) -> Result<Self, CredentialsError> {
        validate_pin(pin)?;
        validate_puk(puk)?;
        validate_pairing_pass(pairing_pass)?;

        Ok(Self {
            pin: pin.to_string(),
            puk: puk.to_string(),
            pairing_pass: pairing_pass.to_string(),
        })
    }

    /// Generates credentials with a random PIN, PUK and pairing password
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let pin = rng.random_range(0..MAX_PIN_NUMBER);
        let puk = rng.random_range(0..MAX_PUK_NUMBER);

        Self {
            pin: format!("{:06}", pin),  // Ensure 6 digits with zero padding
            puk: format!("{:012}", puk), // Ensure 12 digits with zero padding
            pairing_pass: generate_pairing_pass(),
        }
    }

    /// Returns the PIN string
    pub fn pin(&self) -> &str {
        &self.pin
    }

    /// Returns the PUK string
    pub fn puk(&self) -> &str {
        &self.puk
    }

    /// Returns the pairing password string
    pub fn pairing_pass(&self) -> &str {
        &self.pairing_pass
    }

    /// Renders the save-this memo shown to the user before initializing
    pub fn memo(&self) -> String {
        format!(
            "PIN: {}\nPUK: {}\nPairing Password: {}",
            self.pin, self.puk, self.pairing_pass
        )
    }
}

fn generate_pairing_pass() -> String {
    let mut r = vec![0u8; 12];
    rand::rng().fill_bytes(&mut r);
    BASE64_URL_SAFE_NO_PAD.encode(&r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_new() {
        let credentials = Credentials::new("123456", "123456789012", "test-pairing-pass").unwrap();
        assert_eq!(credentials.pin(), "123456");
        assert_eq!(credentials.puk(), "123456789012");
        assert_eq!(credentials.pairing_pass(), "test-pairing-pass");
    }

    #[test]
    fn invalid_pin_length() {
        assert_eq!(
            Credentials::new("12345", "123456789012", "pass").unwrap_err(),
            CredentialsError::IncorrectLength {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn invalid_pin_characters() {
        assert_eq!(
            Credentials::new("12a456", "123456789012", "pass").unwrap_err(),
            CredentialsError::InvalidCharacters
        );
    }

    #[test]
    fn invalid_puk_length() {
        assert_eq!(
            Credentials::new("123456", "12345678901", "pass").unwrap_err(),
            CredentialsError::IncorrectLength {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn empty_pairing_password() {
        assert_eq!(
            Credentials::new("123456", "123456789012", "").unwrap_err(),
            CredentialsError::EmptyPairingPassword
        );
    }

    #[test]
    fn generate_shape() {
        let credentials = Credentials::generate();

        assert_eq!(credentials.pin().len(), PIN_LENGTH);
        assert!(credentials.pin().chars().all(|c| c.is_ascii_digit()));

        assert_eq!(credentials.puk().len(), PUK_LENGTH);
        assert!(credentials.puk().chars().all(|c| c.is_ascii_digit()));

        assert!(!credentials.pairing_pass().is_empty());
        assert!(
            BASE64_URL_SAFE_NO_PAD
                .decode(credentials.pairing_pass())
                .is_ok()
        );
    }

    #[test]
    fn memo_rendering() {
        let credentials = Credentials::new("123456", "123456789012", "secret").unwrap();
        assert_eq!(
            credentials.memo(),
            "PIN: 123456\nPUK: 123456789012\nPairing Password: secret"
        );
    }
}
