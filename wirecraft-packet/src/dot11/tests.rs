use super::*;
use crate::pdu::{Pdu, PduKind};

const AP: HwAddr = HwAddr([0x00, 0x1f, 0x33, 0x44, 0x55, 0x66]);
const STA: HwAddr = HwAddr([0x00, 0x24, 0xd6, 0xaa, 0xbb, 0xcc]);

fn beacon_frame() -> Vec<u8> {
    let mut wire = Vec::new();
    // Frame control: management, subtype 8
    wire.extend_from_slice(&[0x80, 0x00]);
    wire.extend_from_slice(&[0x00, 0x00]); // duration
    wire.extend_from_slice(HwAddr::BROADCAST.as_bytes());
    wire.extend_from_slice(AP.as_bytes());
    wire.extend_from_slice(AP.as_bytes());
    wire.extend_from_slice(&[0x00, 0x00]); // sequence control
    // Beacon body: timestamp 0, interval 100, capability 0x0411
    wire.extend_from_slice(&[0; 8]);
    wire.extend_from_slice(&100u16.to_le_bytes());
    wire.extend_from_slice(&0x0411u16.to_le_bytes());
    // SSID "test"
    wire.extend_from_slice(&[0x00, 0x04]);
    wire.extend_from_slice(b"test");
    // Supported rates 1, 2, 5.5, 11 Mbit/s, all basic
    wire.extend_from_slice(&[0x01, 0x04, 0x82, 0x84, 0x8b, 0x96]);
    wire
}

#[test]
fn test_beacon_roundtrip() {
    let input = beacon_frame();
    let parsed = Dot11::from_bytes(&input).unwrap();
    assert_eq!(parsed.frame_control.frame_type, TYPE_MANAGEMENT);
    assert_eq!(parsed.frame_control.subtype, subtype::BEACON);
    match parsed.body {
        Dot11Body::Beacon(body) => {
            assert_eq!(body.timestamp, 0);
            assert_eq!(body.interval, 100);
            assert_eq!(body.capability, 0x0411);
        }
        ref other => panic!("unexpected body {:?}", other),
    }
    assert_eq!(parsed.essid().as_deref(), Some("test"));
    assert_eq!(
        parsed.supported_rates().unwrap(),
        vec![1.0, 2.0, 5.5, 11.0]
    );

    let mut chain = Pdu::Dot11(parsed);
    assert_eq!(chain.serialize(), input);
}

#[test]
fn test_rates_encoding() {
    let mut frame = Dot11::beacon(HwAddr::BROADCAST, AP);
    frame.set_supported_rates(&[1.0, 2.0, 5.5, 11.0]);
    let option = frame.search_option(tags::SUPPORTED_RATES).unwrap();
    assert_eq!(option.value, vec![0x82, 0x84, 0x8b, 0x96]);
}

#[test]
fn test_tagged_parameter_lookup_returns_first() {
    let mut frame = Dot11::beacon(HwAddr::BROADCAST, AP);
    frame.set_essid("first");
    frame.set_essid("second");
    assert_eq!(frame.essid().as_deref(), Some("first"));
    assert_eq!(frame.options().len(), 2);
}

#[test]
fn test_malformed_tag_tail_is_truncated_silently() {
    let mut input = beacon_frame();
    // Declare a tag whose length runs past the buffer
    input.extend_from_slice(&[0x07, 0x20, 0x01]);
    let parsed = Dot11::from_bytes(&input).unwrap();
    // The well-formed tags survive, the bad tail is dropped
    assert_eq!(parsed.options().len(), 2);
    assert!(parsed.search_option(tags::COUNTRY).is_none());
}

#[test]
fn test_truncated_beacon_body_is_malformed() {
    let input = &beacon_frame()[..30];
    assert!(Dot11::from_bytes(input).is_err());
    assert!(Dot11::from_bytes(&[0x80]).is_err());
}

#[test]
fn test_assoc_request_roundtrip() {
    let mut frame = Dot11::assoc_request(AP, STA);
    match &mut frame.body {
        Dot11Body::AssocRequest(body) => {
            body.capability = 0x0431;
            body.listen_interval = 10;
        }
        _ => unreachable!(),
    }
    frame.set_essid("corp");
    let mut chain = Pdu::Dot11(frame);
    let wire = chain.serialize();
    assert_eq!(wire.len(), 24 + 4 + 6);

    let parsed = Dot11::from_bytes(&wire).unwrap();
    match parsed.body {
        Dot11Body::AssocRequest(body) => {
            assert_eq!(body.capability, 0x0431);
            assert_eq!(body.listen_interval, 10);
        }
        ref other => panic!("unexpected body {:?}", other),
    }
    assert_eq!(parsed.essid().as_deref(), Some("corp"));
}

#[test]
fn test_assoc_response_body_fields() {
    let mut frame = Dot11::assoc_response(STA, AP);
    match &mut frame.body {
        Dot11Body::AssocResponse(body) => {
            body.capability = 0x0411;
            body.status_code = 0;
            body.aid = 0xc001;
        }
        _ => unreachable!(),
    }
    let mut chain = Pdu::Dot11(frame);
    let wire = chain.serialize();
    let parsed = Dot11::from_bytes(&wire).unwrap();
    assert_eq!(
        parsed.body,
        Dot11Body::AssocResponse(AssocResponseBody {
            capability: 0x0411,
            status_code: 0,
            aid: 0xc001,
        })
    );
}

#[test]
fn test_disassoc_reason_code() {
    let mut frame = Dot11::disassoc(STA, AP);
    frame.body = Dot11Body::Disassoc(DisassocBody { reason_code: 8 });
    let mut chain = Pdu::Dot11(frame);
    let wire = chain.serialize();
    assert_eq!(wire.len(), 26);
    assert_eq!(&wire[24..26], &8u16.to_le_bytes());
}

#[test]
fn test_addr4_present_iff_both_ds_flags() {
    let mut frame = Dot11::qos_data(AP, STA);
    assert_eq!(frame.header_size(), 26);
    frame.frame_control.to_ds = true;
    assert_eq!(frame.header_size(), 26);
    frame.frame_control.from_ds = true;
    assert_eq!(frame.header_size(), 32);
    frame.addr4 = Some(HwAddr([1, 2, 3, 4, 5, 6]));

    let mut chain = Pdu::Dot11(frame);
    let wire = chain.serialize();
    assert_eq!(&wire[24..30], &[1, 2, 3, 4, 5, 6]);

    let parsed = Dot11::from_bytes(&wire).unwrap();
    assert_eq!(parsed.addr4, Some(HwAddr([1, 2, 3, 4, 5, 6])));
    match parsed.body {
        Dot11Body::QosData { qos_control } => assert_eq!(qos_control, 0),
        ref other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_data_frame_wraps_snap() {
    let mut wire = Vec::new();
    // Frame control: data, subtype 0
    wire.extend_from_slice(&[0x08, 0x00]);
    wire.extend_from_slice(&[0x00; 22]);
    // LLC/SNAP with an opaque protocol
    wire.extend_from_slice(&[0xAA, 0xAA, 0x03, 0x00, 0x00, 0x00, 0x20, 0x00]);
    wire.extend_from_slice(&[0xde, 0xad]);

    let parsed = Dot11::from_bytes(&wire).unwrap();
    assert_eq!(parsed.body, Dot11Body::Data);
    let inner = parsed.inner.as_ref().unwrap();
    assert_eq!(inner.kind(), PduKind::Snap);
}

#[test]
fn test_sequence_control_split() {
    let mut frame = Dot11::new(AP, STA);
    frame.frame_control.subtype = subtype::PROBE_REQUEST;
    frame.frag_number = 0x5;
    frame.seq_number = 0xabc;
    let mut chain = Pdu::Dot11(frame);
    let wire = chain.serialize();
    assert_eq!(u16::from_le_bytes([wire[22], wire[23]]), 0xabc5);

    let parsed = Dot11::from_bytes(&wire).unwrap();
    assert_eq!(parsed.frag_number, 0x5);
    assert_eq!(parsed.seq_number, 0xabc);
}

#[test]
fn test_rsn_information_roundtrip() {
    let info = RsnInformation::wpa2_psk();
    let mut frame = Dot11::beacon(HwAddr::BROADCAST, AP);
    frame.set_rsn_information(&info);

    let mut chain = Pdu::Dot11(frame);
    let wire = chain.serialize();
    let parsed = Dot11::from_bytes(&wire).unwrap();
    let decoded = parsed.rsn_information().unwrap().unwrap();
    assert_eq!(decoded, info);
    assert_eq!(decoded.version, 1);
    assert_eq!(decoded.group_suite, CipherSuite::Ccmp);
    assert_eq!(decoded.pairwise_cyphers(), &[CipherSuite::Ccmp]);
    assert_eq!(decoded.akm_cyphers(), &[AkmSuite::Psk]);
}

#[test]
fn test_rsn_wire_layout() {
    let wire = RsnInformation::wpa2_psk().serialize();
    assert_eq!(
        wire,
        vec![
            0x01, 0x00, // version
            0x00, 0x0f, 0xac, 0x04, // group CCMP
            0x01, 0x00, // one pairwise suite
            0x00, 0x0f, 0xac, 0x04, // CCMP
            0x01, 0x00, // one AKM suite
            0x00, 0x0f, 0xac, 0x02, // PSK
            0x00, 0x00, // capabilities
        ]
    );
}

#[test]
fn test_rsn_inconsistent_length_is_malformed() {
    // Claims two pairwise suites but carries none
    let bad = [0x01, 0x00, 0x00, 0x0f, 0xac, 0x04, 0x02, 0x00];
    assert!(RsnInformation::parse(&bad).is_err());
}
