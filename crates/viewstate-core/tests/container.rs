use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use viewstate_core::{DecodedValue, SignatureAlgorithm, Viewstate, ViewstateError};

fn encode(body: &[u8], signature_len: usize) -> String {
    let mut raw = vec![0xff, 0x01];
    raw.extend_from_slice(body);
    raw.extend(std::iter::repeat_n(0x5a, signature_len));
    STANDARD.encode(raw)
}

#[test]
fn decodes_text_and_classifies_sha256() {
    let text = encode(&[0x1e, 0x05, b'h', b'e', b'l', b'l', b'o'], 32);
    let mut viewstate = Viewstate::new(&text).unwrap();

    let value = viewstate.decode().unwrap();
    assert_eq!(value.to_string(), "hello");
    assert_eq!(viewstate.mac(), SignatureAlgorithm::HmacSha256);
    assert_eq!(viewstate.signature(), &[0x5a; 32]);
}

#[test]
fn mapping_collision_keeps_second_value() {
    let body = [
        0x18, 0x02, 0x02, 0x07, 0x67, 0x1e, 0x01, b'7', 0x68, 0x00,
    ];
    let mut viewstate = Viewstate::new(&encode(&body, 0)).unwrap();
    let value = viewstate.decode().unwrap();

    let mapping = value.as_mapping().expect("mapping");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get("7"), Some(&DecodedValue::Boolean(false)));
    assert_eq!(mapping.replaced().len(), 1);
    assert_eq!(mapping.replaced()[0].key, DecodedValue::Integer(7));
}

#[test]
fn sparse_array_out_of_range_is_invalid_index() {
    let body = [0x3c, 0x1f, 0x00, 0x05, 0x01, 0x05, 0x67, 0x00];
    let mut viewstate = Viewstate::new(&encode(&body, 20)).unwrap();
    let err = viewstate.decode().unwrap_err();
    assert!(matches!(
        err,
        ViewstateError::InvalidIndex {
            index: 5,
            length: 5
        }
    ));
    assert!(viewstate.value().is_none());
}

#[test]
fn unknown_marker_surfaces_from_container() {
    let mut viewstate = Viewstate::new(&encode(&[0x99, 0x00], 20)).unwrap();
    let err = viewstate.decode().unwrap_err();
    assert!(matches!(err, ViewstateError::UnknownMarker { marker: 0x99, .. }));
    assert!(err.to_string().contains("0x99"));
}

#[test]
fn bad_preamble_from_text() {
    let text = STANDARD.encode([0x01, 0xff, 0x67, 0x00]);
    let mut viewstate = Viewstate::new(&text).unwrap();
    let err = viewstate.decode().unwrap_err();
    assert!(err.to_string().contains("bad preamble"));
}

#[test]
fn containers_decode_independently_across_threads() {
    let texts: Vec<String> = (0u8..4)
        .map(|n| encode(&[0x02, n, 0x67, 0x00], 20))
        .collect();

    let handles: Vec<_> = texts
        .into_iter()
        .map(|text| {
            std::thread::spawn(move || {
                let mut viewstate = Viewstate::new(&text).unwrap();
                let value = viewstate.decode().unwrap().clone();
                (value, viewstate.mac(), viewstate.signature().len())
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let (value, mac, signature_len) = handle.join().unwrap();
        assert_eq!(value, DecodedValue::Integer(n as u64));
        assert_eq!(mac, SignatureAlgorithm::Unknown);
        assert_eq!(signature_len, 22);
    }
}
