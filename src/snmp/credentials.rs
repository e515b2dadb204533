// SPDX-License-Identifier: MIT

//! SNMPv2c community auth and the SNMPv3 USM security matrix
//! {noAuthNoPriv, authNoPriv, authPriv} × auth∈{MD5,SHA} × priv∈{DES,AES}.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProtocol {
    Md5,
    Sha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivProtocol {
    Des,
    Aes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

#[derive(Debug, Clone)]
pub struct UsmCredentials {
    pub user: String,
    pub level: SecurityLevel,
    pub auth: Option<(AuthProtocol, String)>,
    pub privacy: Option<(PrivProtocol, String)>,
}

impl UsmCredentials {
    pub fn no_auth_no_priv(user: impl Into<String>) -> Self {
        UsmCredentials {
            user: user.into(),
            level: SecurityLevel::NoAuthNoPriv,
            auth: None,
            privacy: None,
        }
    }

    pub fn auth_no_priv(user: impl Into<String>, proto: AuthProtocol, passphrase: impl Into<String>) -> Self {
        UsmCredentials {
            user: user.into(),
            level: SecurityLevel::AuthNoPriv,
            auth: Some((proto, passphrase.into())),
            privacy: None,
        }
    }

    pub fn auth_priv(
        user: impl Into<String>,
        auth_proto: AuthProtocol,
        auth_pass: impl Into<String>,
        priv_proto: PrivProtocol,
        priv_pass: impl Into<String>,
    ) -> Self {
        UsmCredentials {
            user: user.into(),
            level: SecurityLevel::AuthPriv,
            auth: Some((auth_proto, auth_pass.into())),
            privacy: Some((priv_proto, priv_pass.into())),
        }
    }
}

/// Per-connector authentication; either SNMPv2c community or the SNMPv3
/// USM matrix.
#[derive(Debug, Clone)]
pub enum Credentials {
    V2c { community: String },
    V3(UsmCredentials),
}

impl Credentials {
    pub fn v2c(community: impl Into<String>) -> Self {
        Credentials::V2c { community: community.into() }
    }
}
