//! Decoded value tree.
//!
//! `DecodedValue` is the single output type of every decoder. Structured
//! components (enum identity and ordinal, palette index, reference index,
//! format pattern and arguments) are kept as-is; `Display` renders the
//! canonical string form. Mappings key on the same form rendered byte-exact,
//! so text keys that are not valid UTF-8 stay distinct.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    Absent,
    Boolean(bool),
    Integer(u64),
    Text(Text),
    BinaryBlob(#[serde(serialize_with = "serialize_hex")] Vec<u8>),
    EnumValue {
        inner: Box<DecodedValue>,
        ordinal: u64,
    },
    ColorIndex(u8),
    RgbaColor {
        r: u8,
        g: u8,
        b: u8,
        a: u8,
    },
    TimeStub(Unresolved),
    UnitStub(Unresolved),
    Pair(Box<DecodedValue>, Box<DecodedValue>),
    Triplet(Box<DecodedValue>, Box<DecodedValue>, Box<DecodedValue>),
    Reference(u64),
    FormattedText {
        pattern: Box<DecodedValue>,
        args: Text,
    },
    Sequence(Vec<DecodedValue>),
    Mapping(Mapping),
    TypedSequence {
        type_tag: Box<DecodedValue>,
        elements: Vec<DecodedValue>,
    },
}

impl DecodedValue {
    /// Short variant name, matching the `type` field of the JSON form.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedValue::Absent => "absent",
            DecodedValue::Boolean(_) => "boolean",
            DecodedValue::Integer(_) => "integer",
            DecodedValue::Text(_) => "text",
            DecodedValue::BinaryBlob(_) => "binary_blob",
            DecodedValue::EnumValue { .. } => "enum_value",
            DecodedValue::ColorIndex(_) => "color_index",
            DecodedValue::RgbaColor { .. } => "rgba_color",
            DecodedValue::TimeStub(_) => "time_stub",
            DecodedValue::UnitStub(_) => "unit_stub",
            DecodedValue::Pair(..) => "pair",
            DecodedValue::Triplet(..) => "triplet",
            DecodedValue::Reference(_) => "reference",
            DecodedValue::FormattedText { .. } => "formatted_text",
            DecodedValue::Sequence(_) => "sequence",
            DecodedValue::Mapping(_) => "mapping",
            DecodedValue::TypedSequence { .. } => "typed_sequence",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, DecodedValue::Absent)
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            DecodedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            DecodedValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Elements of a plain or typed sequence.
    pub fn as_elements(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Sequence(elements) => Some(elements),
            DecodedValue::TypedSequence { elements, .. } => Some(elements),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            DecodedValue::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Absent => write!(f, "null"),
            DecodedValue::Boolean(value) => write!(f, "{value}"),
            DecodedValue::Integer(value) => write!(f, "{value}"),
            DecodedValue::Text(text) => write!(f, "{text}"),
            DecodedValue::BinaryBlob(bytes) => write!(f, "{}", hex(bytes)),
            DecodedValue::EnumValue { inner, ordinal } => write!(f, "{inner}:{ordinal}"),
            DecodedValue::ColorIndex(index) => write!(f, "color:{index}"),
            DecodedValue::RgbaColor { r, g, b, a } => write!(f, "rgba({r},{g},{b},{a})"),
            DecodedValue::TimeStub(stub) => write!(f, "time:{}", hex(stub.raw())),
            DecodedValue::UnitStub(stub) => write!(f, "unit:{}", hex(stub.raw())),
            DecodedValue::Pair(first, second) => write!(f, "({first}, {second})"),
            DecodedValue::Triplet(first, second, third) => {
                write!(f, "({first}, {second}, {third})")
            }
            DecodedValue::Reference(index) => write!(f, "ref:{index}"),
            DecodedValue::FormattedText { pattern, args } => write!(f, "{pattern} {args}"),
            DecodedValue::Sequence(elements) => write_list(f, elements),
            DecodedValue::TypedSequence { elements, .. } => write_list(f, elements),
            DecodedValue::Mapping(mapping) => {
                write!(f, "{{")?;
                for (i, (key, entry)) in mapping.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", String::from_utf8_lossy(key), entry.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl DecodedValue {
    /// `Display` form with text bytes copied as-is instead of lossily.
    pub fn key_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_key(&mut out);
        out
    }

    fn write_key(&self, out: &mut Vec<u8>) {
        match self {
            DecodedValue::Text(text) => out.extend_from_slice(text.as_bytes()),
            DecodedValue::EnumValue { inner, ordinal } => {
                inner.write_key(out);
                out.extend_from_slice(format!(":{ordinal}").as_bytes());
            }
            DecodedValue::Pair(first, second) => {
                write_key_list(out, b"(", [&**first, &**second], b")")
            }
            DecodedValue::Triplet(first, second, third) => write_key_list(
                out,
                b"(",
                [&**first, &**second, &**third],
                b")",
            ),
            DecodedValue::FormattedText { pattern, args } => {
                pattern.write_key(out);
                out.push(b' ');
                out.extend_from_slice(args.as_bytes());
            }
            DecodedValue::Sequence(elements) | DecodedValue::TypedSequence { elements, .. } => {
                write_key_list(out, b"[", elements, b"]")
            }
            DecodedValue::Mapping(mapping) => {
                out.push(b'{');
                for (i, (key, entry)) in mapping.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(b", ");
                    }
                    out.extend_from_slice(key);
                    out.extend_from_slice(b": ");
                    entry.value.write_key(out);
                }
                out.push(b'}');
            }
            other => out.extend_from_slice(other.to_string().as_bytes()),
        }
    }
}

fn write_key_list<'v>(
    out: &mut Vec<u8>,
    open: &[u8],
    elements: impl IntoIterator<Item = &'v DecodedValue>,
    close: &[u8],
) {
    out.extend_from_slice(open);
    for (i, element) in elements.into_iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b", ");
        }
        element.write_key(out);
    }
    out.extend_from_slice(close);
}

fn write_list(f: &mut fmt::Formatter<'_>, elements: &[DecodedValue]) -> fmt::Result {
    write!(f, "[")?;
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{element}")?;
    }
    write!(f, "]")
}

/// Length-prefixed text, kept byte-for-byte.
///
/// No charset validation is applied when decoding; display and JSON output
/// use a lossy UTF-8 view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text(Vec<u8>);

impl Text {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for Text {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Fixed-width field whose encoding is not decoded yet.
///
/// Time and unit values are consumed at their fixed width and kept raw;
/// `resolved` is always false until a real decoding exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    #[serde(serialize_with = "serialize_hex")]
    raw: Vec<u8>,
    resolved: bool,
}

impl Unresolved {
    pub fn new(raw: Vec<u8>) -> Self {
        Self {
            raw,
            resolved: false,
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// Decoded key/value pair of a mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingEntry {
    pub key: DecodedValue,
    pub value: DecodedValue,
}

/// Mapping keyed by [`DecodedValue::key_bytes`] of each decoded key.
///
/// A later entry whose key renders to the same bytes replaces the earlier
/// one; the replaced entries are kept in `replaced` in decode order so
/// callers can detect collisions. JSON output renders keys lossily.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Mapping {
    #[serde(serialize_with = "serialize_entries")]
    entries: BTreeMap<Vec<u8>, MappingEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    replaced: Vec<MappingEntry>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under the rendering of `key`, returning the rendered key.
    pub fn insert(&mut self, key: DecodedValue, value: DecodedValue) -> Vec<u8> {
        let rendered = key.key_bytes();
        if let Some(previous) = self
            .entries
            .insert(rendered.clone(), MappingEntry { key, value })
        {
            self.replaced.push(previous);
        }
        rendered
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&DecodedValue> {
        self.entry(key).map(|entry| &entry.value)
    }

    pub fn entry(&self, key: impl AsRef<[u8]>) -> Option<&MappingEntry> {
        self.entries.get(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in rendered-key byte order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &MappingEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_slice(), entry))
    }

    pub fn replaced(&self) -> &[MappingEntry] {
        &self.replaced
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn serialize_entries<S: Serializer>(
    entries: &BTreeMap<Vec<u8>, MappingEntry>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        entries
            .iter()
            .map(|(key, entry)| (String::from_utf8_lossy(key), entry)),
    )
}

fn serialize_hex<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&hex(bytes.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> DecodedValue {
        DecodedValue::Text(Text::from(value))
    }

    #[test]
    fn display_keeps_reference_string_forms() {
        let enum_value = DecodedValue::EnumValue {
            inner: Box::new(text("System.Web.UI.WebControls.Unit")),
            ordinal: 3,
        };
        assert_eq!(enum_value.to_string(), "System.Web.UI.WebControls.Unit:3");
        assert_eq!(DecodedValue::ColorIndex(7).to_string(), "color:7");
        assert_eq!(DecodedValue::Reference(12).to_string(), "ref:12");

        let formatted = DecodedValue::FormattedText {
            pattern: Box::new(text("{0}")),
            args: Text::from("hello"),
        };
        assert_eq!(formatted.to_string(), "{0} hello");
    }

    #[test]
    fn display_renders_nested_containers() {
        let pair = DecodedValue::Pair(
            Box::new(DecodedValue::Integer(1)),
            Box::new(DecodedValue::Sequence(vec![
                DecodedValue::Absent,
                DecodedValue::Boolean(true),
            ])),
        );
        assert_eq!(pair.to_string(), "(1, [null, true])");
    }

    #[test]
    fn mapping_later_entry_wins_and_replaced_is_recorded() {
        let mut mapping = Mapping::new();
        mapping.insert(text("1"), DecodedValue::Boolean(true));
        mapping.insert(DecodedValue::Integer(1), DecodedValue::Boolean(false));

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("1"), Some(&DecodedValue::Boolean(false)));
        let entry = mapping.entry("1").unwrap();
        assert_eq!(entry.key, DecodedValue::Integer(1));
        assert_eq!(mapping.replaced().len(), 1);
        assert_eq!(mapping.replaced()[0].key, text("1"));
    }

    #[test]
    fn key_bytes_keep_nested_text_exact() {
        let key = DecodedValue::Pair(
            Box::new(DecodedValue::Text(Text::new(vec![0xff]))),
            Box::new(DecodedValue::Integer(2)),
        );
        assert_eq!(key.key_bytes(), b"(\xff, 2)");
        assert_eq!(key.to_string(), "(\u{fffd}, 2)");

        let mut mapping = Mapping::new();
        mapping.insert(DecodedValue::Text(Text::new(vec![0xff])), DecodedValue::Integer(1));
        mapping.insert(DecodedValue::Text(Text::new(vec![0xfe])), DecodedValue::Integer(2));
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get([0xfe]), Some(&DecodedValue::Integer(2)));
    }

    #[test]
    fn text_keeps_invalid_utf8_bytes() {
        let value = Text::new(vec![0x66, 0xff, 0x6f]);
        assert_eq!(value.as_bytes(), &[0x66, 0xff, 0x6f]);
        assert_eq!(value.to_string_lossy(), "f\u{fffd}o");
    }

    #[test]
    fn json_form_is_adjacently_tagged() {
        let value = DecodedValue::Pair(
            Box::new(DecodedValue::Absent),
            Box::new(DecodedValue::BinaryBlob(vec![0xde, 0xad])),
        );
        let json = serde_json::to_value(&value).expect("value json");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "pair",
                "value": [
                    { "type": "absent" },
                    { "type": "binary_blob", "value": "dead" }
                ]
            })
        );
    }

    #[test]
    fn stubs_serialize_as_unresolved() {
        let value = DecodedValue::TimeStub(Unresolved::new(vec![0; 8]));
        let json = serde_json::to_value(&value).expect("stub json");
        assert_eq!(json["value"]["resolved"], serde_json::json!(false));
        assert_eq!(json["value"]["raw"], serde_json::json!("0000000000000000"));
    }
}
