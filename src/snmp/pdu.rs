// SPDX-License-Identifier: MIT

//! SNMP message framing: community-based (v1/v2c, RFC 3416) and USM
//! (v3, RFC 3414) wrapping around the shared PDU body.

use crate::oid::Oid;
use crate::snmp::ber::{self, decode_tlv, BerError};
use crate::snmp::value::SnmpValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduKind {
    Get,
    GetNext,
    GetBulk,
    Set,
    Response,
    /// Carries `usmStats*` counters back during SNMPv3 engine discovery
    /// or on a security failure (RFC 3414 §4); never sent by this crate,
    /// only ever decoded from an agent's reply.
    Report,
}

impl PduKind {
    fn tag(self) -> u8 {
        match self {
            PduKind::Get => ber::PDU_GET_REQUEST,
            PduKind::GetNext => ber::PDU_GET_NEXT_REQUEST,
            PduKind::GetBulk => ber::PDU_GET_BULK_REQUEST,
            PduKind::Set => ber::PDU_SET_REQUEST,
            PduKind::Response => ber::PDU_RESPONSE,
            PduKind::Report => ber::PDU_REPORT,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            ber::PDU_GET_REQUEST => PduKind::Get,
            ber::PDU_GET_NEXT_REQUEST => PduKind::GetNext,
            ber::PDU_GET_BULK_REQUEST => PduKind::GetBulk,
            ber::PDU_SET_REQUEST => PduKind::Set,
            ber::PDU_RESPONSE => PduKind::Response,
            ber::PDU_REPORT => PduKind::Report,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VarBind {
    pub oid: Oid,
    pub value: SnmpValue,
}

#[derive(Debug, Clone)]
pub struct Pdu {
    pub kind: PduKind,
    pub request_id: i32,
    /// `error-status` for Response PDUs, `non-repeaters` for GetBulk.
    pub error_status_or_non_repeaters: i32,
    /// `error-index` for Response PDUs, `max-repetitions` for GetBulk.
    pub error_index_or_max_repetitions: i32,
    pub varbinds: Vec<VarBind>,
}

fn encode_varbind(vb: &VarBind, out: &mut Vec<u8>) {
    let mut body = Vec::new();
    ber::encode_oid(&vb.oid, &mut body);
    ber::encode_value(&vb.value, &mut body);
    ber::encode_sequence(&body, out);
}

fn encode_varbind_list(varbinds: &[VarBind], out: &mut Vec<u8>) {
    let mut body = Vec::new();
    for vb in varbinds {
        encode_varbind(vb, &mut body);
    }
    ber::encode_sequence(&body, out);
}

pub fn encode_pdu(pdu: &Pdu) -> Vec<u8> {
    let mut body = Vec::new();
    ber::encode_integer(pdu.request_id as i64, &mut body);
    ber::encode_integer(pdu.error_status_or_non_repeaters as i64, &mut body);
    ber::encode_integer(pdu.error_index_or_max_repetitions as i64, &mut body);
    encode_varbind_list(&pdu.varbinds, &mut body);

    let mut out = Vec::new();
    ber::encode_tlv(pdu.kind.tag(), &body, &mut out);
    out
}

pub fn decode_pdu(bytes: &[u8]) -> Result<Pdu, BerError> {
    let mut pos = 0;
    let outer = decode_tlv(bytes, &mut pos)?;
    let kind = PduKind::from_tag(outer.tag).ok_or(BerError::UnexpectedTag(outer.tag))?;

    let mut inner_pos = 0;
    let request_id_tlv = decode_tlv(&outer.value, &mut inner_pos)?;
    let request_id = ber::decode_integer_value(&request_id_tlv.value) as i32;
    let a_tlv = decode_tlv(&outer.value, &mut inner_pos)?;
    let a = ber::decode_integer_value(&a_tlv.value) as i32;
    let b_tlv = decode_tlv(&outer.value, &mut inner_pos)?;
    let b = ber::decode_integer_value(&b_tlv.value) as i32;

    let varbind_list_tlv = decode_tlv(&outer.value, &mut inner_pos)?;
    let mut varbinds = Vec::new();
    let mut vb_pos = 0;
    while vb_pos < varbind_list_tlv.value.len() {
        let vb_seq = decode_tlv(&varbind_list_tlv.value, &mut vb_pos)?;
        let mut p = 0;
        let oid_tlv = decode_tlv(&vb_seq.value, &mut p)?;
        let oid = ber::decode_oid(&oid_tlv.value)?;
        let value_tlv = decode_tlv(&vb_seq.value, &mut p)?;
        let value = ber::decode_value(&value_tlv)?;
        varbinds.push(VarBind { oid, value });
    }

    Ok(Pdu {
        kind,
        request_id,
        error_status_or_non_repeaters: a,
        error_index_or_max_repetitions: b,
        varbinds,
    })
}

/// Wraps a PDU in an SNMPv1/v2c community message: `SEQUENCE { version,
/// community, pdu }`.
pub fn encode_v2c_message(version: i64, community: &str, pdu: &Pdu) -> Vec<u8> {
    let mut body = Vec::new();
    ber::encode_integer(version, &mut body);
    ber::encode_tlv(ber::TAG_OCTET_STRING, community.as_bytes(), &mut body);
    body.extend_from_slice(&encode_pdu(pdu));

    let mut out = Vec::new();
    ber::encode_sequence(&body, &mut out);
    out
}

pub struct DecodedV2cMessage {
    pub version: i64,
    pub community: String,
    pub pdu: Pdu,
}

pub fn decode_v2c_message(bytes: &[u8]) -> Result<DecodedV2cMessage, BerError> {
    let mut pos = 0;
    let outer = decode_tlv(bytes, &mut pos)?;
    let mut inner_pos = 0;
    let version_tlv = decode_tlv(&outer.value, &mut inner_pos)?;
    let version = ber::decode_integer_value(&version_tlv.value);
    let community_tlv = decode_tlv(&outer.value, &mut inner_pos)?;
    let community = String::from_utf8_lossy(&community_tlv.value).into_owned();
    let pdu = decode_pdu(&outer.value[inner_pos..])?;
    Ok(DecodedV2cMessage { version, community, pdu })
}

/// RFC 3414 §2.2.1 `UsmSecurityParameters`, encoded/decoded both as the
/// contents of `msgSecurityParameters`' wrapping `OCTET STRING`.
#[derive(Debug, Clone, Default)]
pub struct UsmSecurityParams {
    pub engine_id: Vec<u8>,
    pub engine_boots: i32,
    pub engine_time: i32,
    pub user: String,
    pub auth_params: Vec<u8>,
    pub priv_params: Vec<u8>,
}

/// Encodes `params` and returns the encoded bytes alongside the byte
/// range of `auth_params`' *content* within them, so a caller can patch
/// in a real digest after computing it over the fully-assembled message
/// with `auth_params` still zeroed, without re-encoding anything.
fn encode_usm_security_params(params: &UsmSecurityParams) -> (Vec<u8>, std::ops::Range<usize>) {
    let mut body = Vec::new();
    ber::encode_tlv(ber::TAG_OCTET_STRING, &params.engine_id, &mut body);
    ber::encode_integer(params.engine_boots as i64, &mut body);
    ber::encode_integer(params.engine_time as i64, &mut body);
    ber::encode_tlv(ber::TAG_OCTET_STRING, params.user.as_bytes(), &mut body);

    body.push(ber::TAG_OCTET_STRING);
    ber::encode_length(params.auth_params.len(), &mut body);
    let auth_start = body.len();
    body.extend_from_slice(&params.auth_params);
    let auth_range = auth_start..body.len();

    ber::encode_tlv(ber::TAG_OCTET_STRING, &params.priv_params, &mut body);

    let mut seq = Vec::new();
    ber::encode_sequence(&body, &mut seq);
    // `auth_range` was computed against `body`, but `seq` prepends that
    // SEQUENCE's own tag+length header; shift it so it's valid against
    // what's actually returned.
    let seq_header_len = seq.len() - body.len();
    let auth_range = (auth_range.start + seq_header_len)..(auth_range.end + seq_header_len);
    (seq, auth_range)
}

/// `ScopedPDU ::= SEQUENCE { contextEngineID OCTET STRING, contextName
/// OCTET STRING, data PDU }` (RFC 3412 §6.1) — the payload that gets
/// encrypted under `authPriv`, or embedded directly otherwise.
#[derive(Debug, Clone)]
pub struct ScopedPdu {
    pub context_engine_id: Vec<u8>,
    pub context_name: String,
    pub pdu: Pdu,
}

pub fn encode_scoped_pdu(scoped: &ScopedPdu) -> Vec<u8> {
    let mut body = Vec::new();
    ber::encode_tlv(ber::TAG_OCTET_STRING, &scoped.context_engine_id, &mut body);
    ber::encode_tlv(ber::TAG_OCTET_STRING, scoped.context_name.as_bytes(), &mut body);
    body.extend_from_slice(&encode_pdu(&scoped.pdu));
    let mut out = Vec::new();
    ber::encode_sequence(&body, &mut out);
    out
}

pub fn decode_scoped_pdu(bytes: &[u8]) -> Result<ScopedPdu, BerError> {
    let mut pos = 0;
    let outer = decode_tlv(bytes, &mut pos)?;
    let mut p = 0;
    let context_engine_id = decode_tlv(&outer.value, &mut p)?.value;
    let context_name = String::from_utf8_lossy(&decode_tlv(&outer.value, &mut p)?.value).into_owned();
    let pdu = decode_pdu(&outer.value[p..])?;
    Ok(ScopedPdu { context_engine_id, context_name, pdu })
}

/// `msgFlags` bit layout (RFC 3414 §6.6): bit 0 = authFlag, bit 1 =
/// privFlag, bit 2 = reportableFlag (set on every request, clear on
/// responses/reports).
pub const FLAG_AUTH: u8 = 0x01;
pub const FLAG_PRIV: u8 = 0x02;
pub const FLAG_REPORTABLE: u8 = 0x04;

const SECURITY_MODEL_USM: i64 = 3;

/// The `msgData` CHOICE: a plaintext `ScopedPDU` embedded directly, or
/// an `authPriv` message's encrypted form wrapped in an `OCTET STRING`.
pub enum ScopedPduData {
    Plaintext(ScopedPdu),
    Encrypted(Vec<u8>),
}

pub struct V3Message {
    pub msg_id: i32,
    pub msg_max_size: i32,
    pub flags: u8,
    pub security_params: UsmSecurityParams,
    pub scoped_pdu_data: ScopedPduData,
}

/// Encodes a full SNMPv3 message and returns the byte range of
/// `msgAuthenticationParameters`' content within it, so the caller can
/// HMAC the whole (zeroed-auth) message and patch the digest in place —
/// BER's deterministic encoding means the digest never changes the
/// message's length, so no re-encode is needed.
pub fn encode_v3_message(msg: &V3Message) -> (Vec<u8>, std::ops::Range<usize>) {
    let mut global_data = Vec::new();
    ber::encode_integer(msg.msg_id as i64, &mut global_data);
    ber::encode_integer(msg.msg_max_size as i64, &mut global_data);
    ber::encode_tlv(ber::TAG_OCTET_STRING, &[msg.flags], &mut global_data);
    ber::encode_integer(SECURITY_MODEL_USM, &mut global_data);
    let mut header_data = Vec::new();
    ber::encode_sequence(&global_data, &mut header_data);

    let (security_params_der, auth_range_in_params) = encode_usm_security_params(&msg.security_params);
    let mut security_params_octets = Vec::new();
    ber::encode_tlv(ber::TAG_OCTET_STRING, &security_params_der, &mut security_params_octets);
    // the auth range was computed relative to `security_params_der`;
    // shift it past that TLV's own tag+length header now that it's
    // nested in `security_params_octets`.
    let header_len = security_params_octets.len() - security_params_der.len();

    let mut body = Vec::new();
    ber::encode_integer(3, &mut body); // msgVersion
    body.extend_from_slice(&header_data);
    body.extend_from_slice(&security_params_octets);

    match &msg.scoped_pdu_data {
        ScopedPduData::Plaintext(scoped) => body.extend_from_slice(&encode_scoped_pdu(scoped)),
        ScopedPduData::Encrypted(ciphertext) => ber::encode_tlv(ber::TAG_OCTET_STRING, ciphertext, &mut body),
    }

    let mut out = Vec::new();
    ber::encode_sequence(&body, &mut out);

    // `out` = outer SEQUENCE tag+length, then `body` verbatim; `body`
    // itself starts with msgVersion, then header_data, then
    // security_params_octets (whose own tag+length header precedes
    // `security_params_der`). Walk the same nesting to find the
    // absolute offset of the auth digest bytes.
    let outer_header_len = out.len() - body.len();
    let security_params_offset_in_body = 3 + header_data.len();
    let security_params_value_offset = security_params_offset_in_body + header_len;
    let auth_start = outer_header_len + security_params_value_offset + auth_range_in_params.start;
    let auth_end = outer_header_len + security_params_value_offset + auth_range_in_params.end;

    (out, auth_start..auth_end)
}

/// Decodes one TLV starting at absolute offset `*pos` into `bytes`,
/// returning it alongside the absolute byte range of its *value*.
/// Unlike `decode_tlv` (which works against whatever slice it's handed),
/// this always measures against the original buffer, so offsets found
/// this way compose correctly across nested containers.
fn decode_tlv_at(bytes: &[u8], pos: &mut usize) -> Result<(ber::Tlv, std::ops::Range<usize>), BerError> {
    let start = *pos;
    let mut local = 0usize;
    let tlv = decode_tlv(&bytes[start..], &mut local)?;
    *pos = start + local;
    let value_len = tlv.value.len();
    let value_start = start + (local - value_len);
    Ok((tlv, value_start..(value_start + value_len)))
}

/// Decodes a full SNMPv3 message and returns the absolute byte range of
/// `msgAuthenticationParameters`' content within `bytes`, so a caller can
/// re-zero it and verify the sender's digest the same way `authenticate`
/// computed it.
pub fn decode_v3_message(bytes: &[u8]) -> Result<(V3Message, std::ops::Range<usize>), BerError> {
    let mut pos = 0;
    let (_outer, outer_range) = decode_tlv_at(bytes, &mut pos)?;
    let mut p = outer_range.start;

    let (version_tlv, _) = decode_tlv_at(bytes, &mut p)?;
    let _version = ber::decode_integer_value(&version_tlv.value);

    let (_header_tlv, header_range) = decode_tlv_at(bytes, &mut p)?;
    let mut hp = header_range.start;
    let (msg_id_tlv, _) = decode_tlv_at(bytes, &mut hp)?;
    let msg_id = ber::decode_integer_value(&msg_id_tlv.value) as i32;
    let (max_size_tlv, _) = decode_tlv_at(bytes, &mut hp)?;
    let msg_max_size = ber::decode_integer_value(&max_size_tlv.value) as i32;
    let (flags_tlv, _) = decode_tlv_at(bytes, &mut hp)?;
    let flags = flags_tlv.value.first().copied().unwrap_or(0);
    let (_security_model_tlv, _) = decode_tlv_at(bytes, &mut hp)?;

    let (_security_octets_tlv, security_value_range) = decode_tlv_at(bytes, &mut p)?;
    let mut sp = security_value_range.start;
    let (_sp_seq_tlv, sp_body_range) = decode_tlv_at(bytes, &mut sp)?;
    let mut bp = sp_body_range.start;
    let (engine_id_tlv, _) = decode_tlv_at(bytes, &mut bp)?;
    let engine_id = engine_id_tlv.value;
    let (boots_tlv, _) = decode_tlv_at(bytes, &mut bp)?;
    let engine_boots = ber::decode_integer_value(&boots_tlv.value) as i32;
    let (time_tlv, _) = decode_tlv_at(bytes, &mut bp)?;
    let engine_time = ber::decode_integer_value(&time_tlv.value) as i32;
    let (user_tlv, _) = decode_tlv_at(bytes, &mut bp)?;
    let user = String::from_utf8_lossy(&user_tlv.value).into_owned();
    let (auth_tlv, auth_range) = decode_tlv_at(bytes, &mut bp)?;
    let auth_params = auth_tlv.value;
    let (priv_tlv, _) = decode_tlv_at(bytes, &mut bp)?;
    let priv_params = priv_tlv.value;

    let security_params = UsmSecurityParams { engine_id, engine_boots, engine_time, user, auth_params, priv_params };

    let scoped_pdu_data = if bytes.get(p) == Some(&ber::TAG_OCTET_STRING) {
        let (ct_tlv, _) = decode_tlv_at(bytes, &mut p)?;
        ScopedPduData::Encrypted(ct_tlv.value)
    } else {
        ScopedPduData::Plaintext(decode_scoped_pdu(&bytes[p..outer_range.end])?)
    };

    Ok((V3Message { msg_id, msg_max_size, flags, security_params, scoped_pdu_data }, auth_range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdu() -> Pdu {
        Pdu {
            kind: PduKind::Get,
            request_id: 42,
            error_status_or_non_repeaters: 0,
            error_index_or_max_repetitions: 0,
            varbinds: vec![VarBind {
                oid: Oid::new(vec![1, 3, 6, 1, 2, 1, 1, 1, 0]),
                value: SnmpValue::Null,
            }],
        }
    }

    #[test]
    fn pdu_roundtrips() {
        let pdu = sample_pdu();
        let encoded = encode_pdu(&pdu);
        let decoded = decode_pdu(&encoded).unwrap();
        assert_eq!(decoded.kind, PduKind::Get);
        assert_eq!(decoded.request_id, 42);
        assert_eq!(decoded.varbinds.len(), 1);
        assert_eq!(decoded.varbinds[0].oid, pdu.varbinds[0].oid);
    }

    #[test]
    fn v2c_message_roundtrips() {
        let pdu = sample_pdu();
        let encoded = encode_v2c_message(1, "public", &pdu);
        let decoded = decode_v2c_message(&encoded).unwrap();
        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.community, "public");
        assert_eq!(decoded.pdu.request_id, 42);
    }

    #[test]
    fn getbulk_non_repeaters_and_max_repetitions_roundtrip() {
        let pdu = Pdu {
            kind: PduKind::GetBulk,
            request_id: 7,
            error_status_or_non_repeaters: 0,
            error_index_or_max_repetitions: 25,
            varbinds: vec![VarBind {
                oid: Oid::new(vec![1, 3, 6, 1, 2, 1, 2, 2, 1, 1]),
                value: SnmpValue::Null,
            }],
        };
        let encoded = encode_pdu(&pdu);
        let decoded = decode_pdu(&encoded).unwrap();
        assert_eq!(decoded.kind, PduKind::GetBulk);
        assert_eq!(decoded.error_index_or_max_repetitions, 25);
    }

    #[test]
    fn v3_message_roundtrips_and_locates_auth_params() {
        let scoped = ScopedPdu {
            context_engine_id: b"engine-1".to_vec(),
            context_name: String::new(),
            pdu: sample_pdu(),
        };
        let security_params = UsmSecurityParams {
            engine_id: b"engine-1".to_vec(),
            engine_boots: 3,
            engine_time: 12345,
            user: "alice".to_string(),
            auth_params: vec![0u8; 12],
            priv_params: Vec::new(),
        };
        let msg = V3Message {
            msg_id: 7,
            msg_max_size: 65507,
            flags: FLAG_AUTH | FLAG_REPORTABLE,
            security_params,
            scoped_pdu_data: ScopedPduData::Plaintext(scoped),
        };
        let (mut encoded, auth_range) = encode_v3_message(&msg);
        assert!(encoded[auth_range.clone()].iter().all(|&b| b == 0));

        // patch in a fake digest the way `transport.rs` patches a real
        // HMAC in after encoding with the auth field zeroed.
        let fake_digest = [0xAAu8; 12];
        encoded[auth_range.clone()].copy_from_slice(&fake_digest);

        let (decoded, decoded_auth_range) = decode_v3_message(&encoded).unwrap();
        assert_eq!(decoded_auth_range, auth_range);
        assert_eq!(decoded.security_params.auth_params, fake_digest);
        assert_eq!(decoded.msg_id, 7);
        assert_eq!(decoded.security_params.user, "alice");
        assert_eq!(decoded.security_params.engine_boots, 3);
        assert_eq!(decoded.security_params.engine_time, 12345);
        match decoded.scoped_pdu_data {
            ScopedPduData::Plaintext(scoped) => assert_eq!(scoped.pdu.request_id, 42),
            ScopedPduData::Encrypted(_) => panic!("expected plaintext scoped pdu"),
        }
    }

    #[test]
    fn v3_message_with_encrypted_scoped_pdu_roundtrips() {
        let security_params = UsmSecurityParams {
            engine_id: b"engine-1".to_vec(),
            engine_boots: 1,
            engine_time: 99,
            user: "bob".to_string(),
            auth_params: vec![0u8; 12],
            priv_params: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        let msg = V3Message {
            msg_id: 9,
            msg_max_size: 1500,
            flags: FLAG_AUTH | FLAG_PRIV | FLAG_REPORTABLE,
            security_params,
            scoped_pdu_data: ScopedPduData::Encrypted(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        };
        let (encoded, _auth_range) = encode_v3_message(&msg);
        let (decoded, _) = decode_v3_message(&encoded).unwrap();
        assert_eq!(decoded.security_params.priv_params, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        match decoded.scoped_pdu_data {
            ScopedPduData::Encrypted(ct) => assert_eq!(ct, vec![0xDE, 0xAD, 0xBE, 0xEF]),
            ScopedPduData::Plaintext(_) => panic!("expected encrypted scoped pdu"),
        }
    }
}
