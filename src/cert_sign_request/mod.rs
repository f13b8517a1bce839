use std::{
    fs::{create_dir_all, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::info;
use rcgen::CertificateParams;
use time::{macros::format_description, OffsetDateTime};

use crate::{
    config::{OutputConfig, SessionPlan},
    error::CsrError,
    utils::LineSource,
};

use self::{
    dn::SubjectFields,
    key::{Password, RequestKey},
    san::SubjectAltNames,
};

pub mod dn;
pub mod key;
pub mod san;

/// Everything collected for one request. Consumed by [`create_csr`].
///
/// [`create_csr`]: CertificateRequestInfo::create_csr
#[derive(Debug)]
pub struct CertificateRequestInfo {
    common_name: String,
    subject: SubjectFields,
    sans: SubjectAltNames,
    password: Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub csr_path: PathBuf,
    pub key_path: PathBuf,
}

impl CertificateRequestInfo {
    pub fn new(
        common_name: String,
        subject: SubjectFields,
        password: Password,
    ) -> Result<Self, CsrError> {
        if common_name.is_empty() {
            return Err(CsrError::MissingCommonName);
        }
        let sans = SubjectAltNames::new(&common_name);
        Ok(Self {
            common_name,
            subject,
            sans,
            password,
        })
    }

    pub fn sans_mut(&mut self) -> &mut SubjectAltNames {
        &mut self.sans
    }

    /// Builds and signs the PKCS#10 request, returned as PEM.
    pub fn sign_request(&self, key: &RequestKey) -> Result<String, CsrError> {
        let mut params = CertificateParams::default();
        params.distinguished_name =
            self.subject.distinguished_name(&self.common_name);
        params.subject_alt_names = self.sans.to_san_types()?;

        let csr = params.serialize_request(&key.signing_key()?)?;
        Ok(csr.pem()?)
    }

    /// Generates the key, signs the request and writes both files.
    pub fn create_csr(
        self,
        output: &OutputConfig,
    ) -> Result<WrittenArtifacts, CsrError> {
        let generated_at = OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc());
        let stem = artifact_stem(generated_at, &self.common_name)?;
        let artifacts = WrittenArtifacts {
            csr_path: output.csr_dir.join(format!("{stem}.csr")),
            key_path: output.key_dir.join(format!("{stem}.key")),
        };

        info!(
            "signing request for {} with DNS names {:?} and IP addresses {:?}",
            self.common_name,
            self.sans.dns_names(),
            self.sans.ip_addresses()
        );
        let key = RequestKey::generate(output.key_bits)?;
        let csr = self.sign_request(&key)?;
        let key_pem = key.export(&self.password)?;

        write_artifact(&artifacts.csr_path, csr.as_bytes())?;
        write_artifact(&artifacts.key_path, &key_pem)?;
        Ok(artifacts)
    }
}

/// Reserved in Windows file names on top of `/` and NUL.
const WINDOWS_RESERVED: &[char] = &['<', '>', ':', '"', '\\', '|', '?', '*'];

/// `<YYYYMMDDHHMMSS>_<common name>`, with characters that can't appear in a
/// file name on this platform replaced by `_`. A wildcard name keeps its `*`
/// outside Windows.
pub fn artifact_stem(
    generated_at: OffsetDateTime,
    common_name: &str,
) -> Result<String, CsrError> {
    let name: String = common_name
        .chars()
        .map(|c| match c {
            '/' | '\0' => '_',
            c if cfg!(windows) && (c.is_control() || WINDOWS_RESERVED.contains(&c)) => '_',
            c => c,
        })
        .collect();
    Ok(format!("{}_{name}", generated_at.format(format_description!(
        "[year][month][day][hour][minute][second]"
    ))?))
}

fn filesystem_error(path: &Path) -> impl FnOnce(io::Error) -> CsrError {
    let path = path.to_owned();
    move |source| CsrError::Filesystem { path, source }
}

fn write_artifact(path: &Path, contents: &[u8]) -> Result<(), CsrError> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir).map_err(filesystem_error(dir))?;
    }
    File::create(path)
        .map_err(filesystem_error(path))?
        .write_all(contents)
        .map_err(filesystem_error(path))?;
    info!("wrote {path:?}");
    Ok(())
}

/// One full interactive session, from the common name to the written files.
pub fn run(
    plan: &SessionPlan,
    input: &mut impl LineSource,
) -> Result<WrittenArtifacts, CsrError> {
    println!("Welcome to the CSR Generator.");
    let common_name = dn::prompt_common_name(input)?;
    let subject = dn::get_subject(input, &plan.subject_defaults)?;
    let password = key::choose_password(input, &plan.output.password_file)?;

    let mut request =
        CertificateRequestInfo::new(common_name, subject, password)?;
    san::collect_sans(input, request.sans_mut())?;
    request.create_csr(&plan.output)
}
