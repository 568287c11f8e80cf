use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PREAMBLE: [u8; 2] = [0xff, 0x01];

const MARKER_NULL: u8 = 0x01;
const MARKER_INTEGER: u8 = 0x02;
const MARKER_STRING: u8 = 0x05;
const MARKER_TIME: u8 = 0x06;
const MARKER_RGBA: u8 = 0x09;
const MARKER_COLOR: u8 = 0x0a;
const MARKER_ENUM: u8 = 0x0b;
const MARKER_PAIR: u8 = 0x0f;
const MARKER_STRING_SLICE: u8 = 0x15;
const MARKER_SLICE: u8 = 0x16;
const MARKER_MAP: u8 = 0x18;
const MARKER_UNIT: u8 = 0x1b;
const MARKER_STRING_ALT: u8 = 0x1e;
const MARKER_STRING_REF: u8 = 0x1f;
const MARKER_FORMATTED_STRING: u8 = 0x28;
const MARKER_BINARY: u8 = 0x32;
const MARKER_SPARSE_ARRAY: u8 = 0x3c;
const MARKER_NULL_ALT: u8 = 0x64;
const MARKER_TRUE: u8 = 0x67;
const MARKER_FALSE: u8 = 0x68;

const HMAC_SHA1_LEN: usize = 20;
const HMAC_SHA256_LEN: usize = 32;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    for fixture in fixtures() {
        write_fixture(&root.join(fixture.name), &fixture)?;
    }
    Ok(())
}

struct Fixture {
    name: &'static str,
    body: Vec<u8>,
    signature_len: usize,
}

fn fixtures() -> Vec<Fixture> {
    vec![
        Fixture {
            name: "integer_sha1",
            body: integer(300),
            signature_len: HMAC_SHA1_LEN,
        },
        Fixture {
            name: "page_sha256",
            body: page_body(),
            signature_len: HMAC_SHA256_LEN,
        },
        Fixture {
            name: "controls_sha1",
            body: controls_body(),
            signature_len: HMAC_SHA1_LEN,
        },
        Fixture {
            name: "sparse_unknown",
            body: sparse_body(),
            signature_len: 16,
        },
        Fixture {
            name: "blob_unsigned",
            body: blob_body(),
            signature_len: 0,
        },
    ]
}

// pair(pair("123456789", pair(null, {"Title": "Hello", ref:3: [true, false]})), null)
fn page_body() -> Vec<u8> {
    let mut map = vec![MARKER_MAP, 2];
    map.extend(text(MARKER_STRING_ALT, "Title"));
    map.extend(text(MARKER_STRING_ALT, "Hello"));
    map.extend([MARKER_STRING_REF, 3]);
    map.extend([MARKER_SLICE, 2, MARKER_TRUE, MARKER_FALSE]);

    let mut inner = vec![MARKER_PAIR];
    inner.extend(text(MARKER_STRING, "123456789"));
    inner.push(MARKER_PAIR);
    inner.push(MARKER_NULL_ALT);
    inner.extend(map);

    let mut body = vec![MARKER_PAIR];
    body.extend(inner);
    body.push(MARKER_NULL);
    body
}

// [Color:2, rgba(1,2,3,255), "{0} x", time stub, unit stub, color:7]
fn controls_body() -> Vec<u8> {
    let mut body = vec![MARKER_SLICE, 6];
    body.push(MARKER_ENUM);
    body.extend(text(MARKER_STRING_ALT, "Color"));
    body.push(2);
    body.extend([MARKER_RGBA, 1, 2, 3, 255]);
    body.push(MARKER_FORMATTED_STRING);
    body.extend(text(MARKER_STRING_ALT, "{0}"));
    body.extend(bare_text("x"));
    body.push(MARKER_TIME);
    body.extend(1..=8u8);
    body.push(MARKER_UNIT);
    body.extend([0u8; 12]);
    body.extend([MARKER_COLOR, 7]);
    body
}

// length 3, one entry at index 1
fn sparse_body() -> Vec<u8> {
    let mut body = vec![MARKER_SPARSE_ARRAY, MARKER_STRING_REF, 1, 3, 1, 1];
    body.extend(text(MARKER_STRING_ALT, "x"));
    body
}

fn blob_body() -> Vec<u8> {
    let mut body = vec![MARKER_PAIR, MARKER_BINARY, 3, 0xde, 0xad, 0xbe];
    body.extend([MARKER_STRING_SLICE, 2]);
    body.extend(bare_text("a"));
    body.extend(bare_text("b"));
    body
}

fn integer(value: u32) -> Vec<u8> {
    let mut out = vec![MARKER_INTEGER];
    out.extend(varint(value));
    out
}

fn text(marker: u8, value: &str) -> Vec<u8> {
    let mut out = vec![marker];
    out.extend(bare_text(value));
    out
}

fn bare_text(value: &str) -> Vec<u8> {
    let mut out = varint(value.len() as u32);
    out.extend_from_slice(value.as_bytes());
    out
}

fn varint(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

fn write_fixture(dir: &Path, fixture: &Fixture) -> Result<(), String> {
    let mut raw = PREAMBLE.to_vec();
    raw.extend_from_slice(&fixture.body);
    raw.extend((0..fixture.signature_len).map(|i| i as u8));

    fs::create_dir_all(dir).map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;
    let path = dir.join("input.txt");
    fs::write(&path, format!("{}\n", STANDARD.encode(&raw)))
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    Ok(())
}
