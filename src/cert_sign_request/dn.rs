use log::warn;
use rcgen::{DistinguishedName, DnType, DnValue, Ia5String};
use serde::{Deserialize, Serialize};

use crate::{
    error::CsrError,
    utils::{prompt_selection, prompt_string, LineSource},
};

/// PKCS#9 emailAddress.
pub const EMAIL_ADDRESS_OID: [u64; 7] = [1, 2, 840, 113549, 1, 9, 1];

/// Subject fields besides the common name. Also the `[subject]` table of the
/// config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubjectFields {
    pub country: String,
    pub province: String,
    pub locality: String,
    pub organization: String,
    pub email: String,
}

impl SubjectFields {
    /// Empty fields are left out of the name. The email is an IA5String
    /// when it is ASCII and a UTF8String otherwise.
    pub fn distinguished_name(&self, common_name: &str) -> DistinguishedName {
        let mut dn = DistinguishedName::new();

        for (dn_type, value) in [
            (DnType::CountryName, &self.country),
            (DnType::StateOrProvinceName, &self.province),
            (DnType::LocalityName, &self.locality),
            (DnType::OrganizationName, &self.organization),
        ] {
            if !value.is_empty() {
                dn.push(dn_type, value.clone());
            }
        }
        dn.push(DnType::CommonName, common_name.to_owned());
        if !self.email.is_empty() {
            let email = match Ia5String::try_from(self.email.clone()) {
                Ok(ia5) => DnValue::Ia5String(ia5),
                Err(_) => {
                    warn!("email {:?} is not ASCII, encoding it as UTF-8", self.email);
                    DnValue::Utf8String(self.email.clone())
                }
            };
            dn.push(DnType::CustomDnType(EMAIL_ADDRESS_OID.to_vec()), email);
        }

        dn
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectChoice {
    Defaults,
    NewValues,
}

impl From<u32> for SubjectChoice {
    fn from(option: u32) -> Self {
        match option {
            2 => Self::NewValues,
            1 => Self::Defaults,
            other => {
                warn!("unknown subject option {other}, using the defaults");
                Self::Defaults
            }
        }
    }
}

/// Asks until a non-blank common name is given.
pub fn prompt_common_name(
    input: &mut impl LineSource,
) -> Result<String, CsrError> {
    loop {
        let answer = input
            .read_line("What would be the Common Name: ")?
            .ok_or(CsrError::MissingCommonName)?;
        let common_name = answer.trim();
        if !common_name.is_empty() {
            return Ok(common_name.to_owned());
        }
        println!("A common name is required.");
    }
}

pub fn get_subject(
    input: &mut impl LineSource,
    defaults: &SubjectFields,
) -> Result<SubjectFields, CsrError> {
    println!("Do you want to use the default options for the subject");
    println!("1.\tUse the default values:");
    println!("\t\tCountry:\t{}", defaults.country);
    println!("\t\tProvince:\t{}", defaults.province);
    println!("\t\tLocality:\t{}", defaults.locality);
    println!("\t\tOrganization:\t{}", defaults.organization);
    println!("\t\tE-Mail:\t\t{}", defaults.email);
    println!("2.\tSet new values");

    let option = prompt_selection(input, "Number of the selected option: ")?;
    match SubjectChoice::from(option) {
        SubjectChoice::Defaults => Ok(defaults.clone()),
        SubjectChoice::NewValues => get_subject_interactive(input),
    }
}

pub fn get_subject_interactive(
    input: &mut impl LineSource,
) -> Result<SubjectFields, CsrError> {
    let country = prompt_string(input, "Country: ")?;
    let province = prompt_string(input, "Province: ")?;
    let locality = prompt_string(input, "Locality: ")?;
    let organization = prompt_string(input, "Organization: ")?;
    let email = prompt_string(input, "Email: ")?;

    Ok(SubjectFields {
        country,
        province,
        locality,
        organization,
        email,
    })
}
