// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;

const HEADER_LEN: usize = 48;
const REPORT_BODY_LEN: usize = 384;
const MR_ENCLAVE_OFFSET: usize = 64;
const MR_SIGNER_OFFSET: usize = 128;
const ISV_PROD_ID_OFFSET: usize = 256;
const ISV_SVN_OFFSET: usize = 258;
const REPORT_DATA_OFFSET: usize = 320;
const SIG_DATA_LEN_OFFSET: usize = HEADER_LEN + REPORT_BODY_LEN;
const SIG_DATA_OFFSET: usize = SIG_DATA_LEN_OFFSET + 4;
/// ISV enclave report signature, attestation key, QE report, QE report
/// signature
const QE_AUTH_OFFSET: usize = 64 + 64 + REPORT_BODY_LEN + 64;

/// QE certification data type for a PEM-encoded PCK certificate chain
pub const PCK_CERT_CHAIN: u16 = 5;

/// The parts of an SGX ECDSA quote this tool relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub version: u16,
    pub mr_enclave: [u8; 32],
    pub mr_signer: [u8; 32],
    pub isv_prod_id: u16,
    pub isv_svn: u16,
    pub report_data: [u8; 64],
    /// certification data type and payload, when the quote carries them
    pub certification: Option<(u16, Vec<u8>)>,
}

fn read<const N: usize>(buf: &[u8], at: usize, what: &str) -> Result<[u8; N], Error> {
    buf.get(at..at + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::Quote(format!("truncated while reading {what} at offset {at}")))
}

fn u16_at(buf: &[u8], at: usize, what: &str) -> Result<u16, Error> {
    read::<2>(buf, at, what).map(u16::from_le_bytes)
}

fn u32_at(buf: &[u8], at: usize, what: &str) -> Result<u32, Error> {
    read::<4>(buf, at, what).map(u32::from_le_bytes)
}

impl Quote {
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let version = u16_at(buf, 0, "version")?;
        let body = HEADER_LEN;

        let mr_enclave = read::<32>(buf, body + MR_ENCLAVE_OFFSET, "MRENCLAVE")?;
        let mr_signer = read::<32>(buf, body + MR_SIGNER_OFFSET, "MRSIGNER")?;
        let isv_prod_id = u16_at(buf, body + ISV_PROD_ID_OFFSET, "ISVPRODID")?;
        let isv_svn = u16_at(buf, body + ISV_SVN_OFFSET, "ISVSVN")?;
        let report_data = read::<64>(buf, body + REPORT_DATA_OFFSET, "report data")?;

        Ok(Self {
            version,
            mr_enclave,
            mr_signer,
            isv_prod_id,
            isv_svn,
            report_data,
            certification: Self::certification(buf)?,
        })
    }

    fn certification(buf: &[u8]) -> Result<Option<(u16, Vec<u8>)>, Error> {
        if buf.len() <= SIG_DATA_LEN_OFFSET {
            return Ok(None);
        }

        let sig_len = u32_at(buf, SIG_DATA_LEN_OFFSET, "signature data length")? as usize;
        let sig = buf
            .get(SIG_DATA_OFFSET..SIG_DATA_OFFSET + sig_len)
            .ok_or_else(|| Error::Quote("signature data overruns the quote".to_string()))?;

        let auth_len = u16_at(sig, QE_AUTH_OFFSET, "QE authentication data length")? as usize;
        let at = QE_AUTH_OFFSET + 2 + auth_len;
        let kind = u16_at(sig, at, "certification data type")?;
        let len = u32_at(sig, at + 2, "certification data length")? as usize;
        let data = sig
            .get(at + 6..at + 6 + len)
            .ok_or_else(|| Error::Quote("certification data overruns the quote".to_string()))?;

        Ok(Some((kind, data.to_vec())))
    }

    /// The PEM chain of the platform's PCK certificate, leaf first
    pub fn pck_chain_pem(&self) -> Option<&[u8]> {
        match &self.certification {
            Some((PCK_CERT_CHAIN, data)) => Some(data.as_slice()),
            _ => None,
        }
    }

    /// The enclave's sealing key as published in the second half of the
    /// report data
    pub fn sealing_public_key(&self) -> [u8; 32] {
        let mut key = [0u8; 32];
        key.copy_from_slice(&self.report_data[32..]);
        key
    }
}
