//! Index labels attached to advertisement outputs. Labels are the only
//! query mechanism the ledger offers: exact-string matching over
//! `prefix_value` tags, AND-combined across a query's label set. All label
//! formatting and parsing is centralized here so the string scheme never
//! leaks into business logic.

use crate::uhrp::record::Advertisement;
use crate::uhrp::url::url_for_hash;

/// Attributes an advertisement output is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    ContentUrl,
    ObjectId,
    Uploader,
    Expiry,
    ContentType,
}

impl LabelKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            LabelKind::ContentUrl => "uhrp_url_",
            LabelKind::ObjectId => "object_identifier_",
            LabelKind::Uploader => "uploader_identity_key_",
            LabelKind::Expiry => "expiry_time_",
            LabelKind::ContentType => "content_type_",
        }
    }
}

/// One typed index label.
///
/// Byte-valued attributes (content URL, object id) hex-encode their UTF-8
/// inside the label; identity keys are already hex; expiry is decimal; the
/// content type rides raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    ContentUrl(String),
    ObjectId(String),
    Uploader(String),
    Expiry(u64),
    ContentType(String),
}

impl Label {
    pub fn kind(&self) -> LabelKind {
        match self {
            Label::ContentUrl(_) => LabelKind::ContentUrl,
            Label::ObjectId(_) => LabelKind::ObjectId,
            Label::Uploader(_) => LabelKind::Uploader,
            Label::Expiry(_) => LabelKind::Expiry,
            Label::ContentType(_) => LabelKind::ContentType,
        }
    }

    /// Renders the label string attached to an output.
    pub fn render(&self) -> String {
        match self {
            Label::ContentUrl(url) => {
                format!("{}{}", self.kind().prefix(), hex::encode(url.as_bytes()))
            }
            Label::ObjectId(id) => {
                format!("{}{}", self.kind().prefix(), hex::encode(id.as_bytes()))
            }
            Label::Uploader(key) => format!("{}{}", self.kind().prefix(), key),
            Label::Expiry(seconds) => format!("{}{}", self.kind().prefix(), seconds),
            Label::ContentType(mime) => format!("{}{}", self.kind().prefix(), mime),
        }
    }

    /// Parses a label string back into its typed value.
    ///
    /// Unknown prefixes and undecodable values yield `None`; callers skip
    /// such labels silently, so a stray tag never aborts a scan.
    pub fn parse(label: &str) -> Option<Label> {
        if let Some(value) = label.strip_prefix(LabelKind::ContentUrl.prefix()) {
            return decode_hex_utf8(value).map(Label::ContentUrl);
        }
        if let Some(value) = label.strip_prefix(LabelKind::ObjectId.prefix()) {
            return decode_hex_utf8(value).map(Label::ObjectId);
        }
        if let Some(value) = label.strip_prefix(LabelKind::Uploader.prefix()) {
            return Some(Label::Uploader(value.to_string()));
        }
        if let Some(value) = label.strip_prefix(LabelKind::Expiry.prefix()) {
            return value.parse::<u64>().ok().map(Label::Expiry);
        }
        if let Some(value) = label.strip_prefix(LabelKind::ContentType.prefix()) {
            return Some(Label::ContentType(value.to_string()));
        }
        None
    }
}

fn decode_hex_utf8(value: &str) -> Option<String> {
    let bytes = hex::decode(value).ok()?;
    String::from_utf8(bytes).ok()
}

/// Finds the first parseable label of `kind` in an output's label set.
pub fn find_value(labels: &[String], kind: LabelKind) -> Option<Label> {
    labels
        .iter()
        .find_map(|raw| Label::parse(raw).filter(|label| label.kind() == kind))
}

pub fn expiry_time(labels: &[String]) -> Option<u64> {
    match find_value(labels, LabelKind::Expiry) {
        Some(Label::Expiry(seconds)) => Some(seconds),
        _ => None,
    }
}

pub fn content_url(labels: &[String]) -> Option<String> {
    match find_value(labels, LabelKind::ContentUrl) {
        Some(Label::ContentUrl(url)) => Some(url),
        _ => None,
    }
}

pub fn object_id(labels: &[String]) -> Option<String> {
    match find_value(labels, LabelKind::ObjectId) {
        Some(Label::ObjectId(id)) => Some(id),
        _ => None,
    }
}

pub fn uploader_identity(labels: &[String]) -> Option<String> {
    match find_value(labels, LabelKind::Uploader) {
        Some(Label::Uploader(key)) => Some(key),
        _ => None,
    }
}

pub fn content_type(labels: &[String]) -> Option<String> {
    match find_value(labels, LabelKind::ContentType) {
        Some(Label::ContentType(mime)) => Some(mime),
        _ => None,
    }
}

/// Derives the full label set for an advertisement output. The content URL
/// label always encodes the URL derived from the record's hash, so lookups
/// by hash and by URL agree.
pub fn labels_for(record: &Advertisement, object_id: &str, uploader_identity: &str) -> Vec<String> {
    let mut labels = vec![
        Label::ContentUrl(url_for_hash(&record.content_hash)).render(),
        Label::ObjectId(object_id.to_string()).render(),
        Label::Uploader(uploader_identity.to_string()).render(),
        Label::Expiry(record.expiry_time).render(),
    ];
    if let Some(mime) = &record.content_type {
        labels.push(Label::ContentType(mime.clone()).render());
    }
    labels
}
