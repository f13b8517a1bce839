use std::{fmt, fs, path::Path};

use log::{debug, info, warn};
use openssl::{
    pkey::{PKey, Private},
    rsa::Rsa,
    symm::Cipher,
};
use rcgen::{KeyPair, PKCS_RSA_SHA256};
use zeroize::Zeroizing;

use crate::{
    error::CsrError,
    utils::{prompt_selection, LineSource},
};

/// Passphrase for the exported key. Empty means the key is written in the
/// clear.
#[derive(Default)]
pub struct Password(Option<Zeroizing<Vec<u8>>>);

impl Password {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Self(None)
        } else {
            Self(Some(Zeroizing::new(bytes)))
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_deref().map(Vec::as_slice)
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Password(<redacted>)"),
            None => f.write_str("Password(None)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProtection {
    Plain,
    Prompted,
    PasswordFile,
}

impl From<u32> for KeyProtection {
    fn from(option: u32) -> Self {
        match option {
            1 => Self::Plain,
            2 => Self::Prompted,
            3 => Self::PasswordFile,
            other => {
                warn!("unknown key option {other}, writing the key unencrypted");
                Self::Plain
            }
        }
    }
}

/// Option 3 is only listed when `password_file` exists.
pub fn choose_password(
    input: &mut impl LineSource,
    password_file: &Path,
) -> Result<Password, CsrError> {
    println!("Which Certificate would you like to generate?");
    println!("1.\tSAN Fields without Password");
    println!("2.\tSAN Fields with Password");
    if password_file.exists() {
        println!("3.\tSAN Fields with {} file", password_file.display());
    }

    match KeyProtection::from(prompt_selection(input, "Option: ")?) {
        KeyProtection::Plain => Ok(Password::none()),
        KeyProtection::Prompted => {
            let password = input.read_secret("Password: ")?;
            Ok(Password::new(password.into_bytes()))
        }
        KeyProtection::PasswordFile => read_password_file(password_file),
    }
}

/// The whole file is the password, trailing newline included.
pub fn read_password_file(path: &Path) -> Result<Password, CsrError> {
    fs::read(path)
        .map(Password::new)
        .map_err(|source| CsrError::PasswordFile {
            path: path.to_owned(),
            source,
        })
}

/// RSA key backing one request.
pub struct RequestKey {
    pkey: PKey<Private>,
}

impl RequestKey {
    pub fn generate(bits: u32) -> Result<Self, CsrError> {
        info!("generating {bits} bit RSA key");
        let rsa = Rsa::generate(bits)?;
        Ok(Self {
            pkey: PKey::from_rsa(rsa)?,
        })
    }

    /// The same key as an rcgen signer, fixed to SHA-256 with RSA.
    pub fn signing_key(&self) -> Result<KeyPair, CsrError> {
        let pkcs8 = Zeroizing::new(self.pkey.private_key_to_pem_pkcs8()?);
        let key_pair = KeyPair::from_pem_and_sign_algo(
            &String::from_utf8_lossy(&pkcs8),
            &PKCS_RSA_SHA256,
        )?;
        Ok(key_pair)
    }

    /// PKCS#1 PEM, AES-256-CBC encrypted when a password is set.
    pub fn export(
        self,
        password: &Password,
    ) -> Result<Zeroizing<Vec<u8>>, CsrError> {
        debug!("exporting private key, encrypted: {}", password.is_set());
        let rsa = self.pkey.rsa()?;
        let pem = match password.as_bytes() {
            Some(passphrase) => rsa.private_key_to_pem_passphrase(
                Cipher::aes_256_cbc(),
                passphrase,
            )?,
            None => rsa.private_key_to_pem()?,
        };
        Ok(Zeroizing::new(pem))
    }
}
