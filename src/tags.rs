//! Per-field annotations and the metadata parsed out of them.
//!
//! A field carries four independent annotations:
//!
//! | key       | value                                   |
//! |-----------|-----------------------------------------|
//! | `doc`     | free text description                   |
//! | `default` | pre-formatted literal, emitted verbatim |
//! | `flags`   | comma-separated `req`, `ro`, `emptyok`  |
//! | `enum`    | `<SiblingField>,<index>`                |
//!
//! [`TagInfo::parse`] folds them into a [`TagInfo`] that the renderer consumes.
use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::TemplateError;
use crate::ir::{StructTy, Ty};

pub const DOC: &str = "doc";
pub const DEFAULT: &str = "default";
pub const FLAGS: &str = "flags";
pub const ENUM: &str = "enum";

/// Raw annotation strings of one field, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(IndexMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc(self, text: impl Into<String>) -> Self {
        self.with(DOC, text)
    }

    pub fn default_value(self, literal: impl Into<String>) -> Self {
        self.with(DEFAULT, literal)
    }

    pub fn flags(self, flags: impl Into<String>) -> Self {
        self.with(FLAGS, flags)
    }

    pub fn enum_binding(self, sibling: &str, index: i64) -> Self {
        self.with(ENUM, format!("{sibling},{index}"))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads a conventional struct tag: space separated `key:"value"` pairs with
    /// escaped values. Reading stops at the first malformed pair; the first
    /// occurrence of a repeated key wins.
    pub fn from_struct_tag(raw: &str) -> Self {
        static PAIR: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r#"^\s*([^\s:"[:cntrl:]]+):"((?:[^"\\]|\\.)*)""#).expect("struct tag pattern")
        });

        let mut tags = Tags::new();
        let mut rest = raw;
        while !rest.trim().is_empty() {
            let Some(caps) = PAIR.captures(rest) else {
                warn!("ignoring malformed struct tag remainder {rest:?}");
                break;
            };
            let (Some(all), Some(key), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                break;
            };
            let Some(value) = unquote(value.as_str()) else {
                warn!("ignoring struct tag {:?}: cannot unescape {:?}", key.as_str(), value.as_str());
                break;
            };
            tags.0.entry(key.as_str().to_string()).or_insert(value);
            rest = &rest[all.end()..];
        }
        tags
    }
}

fn unquote(escaped: &str) -> Option<String> {
    serde_json::from_str::<String>(&format!("\"{escaped}\"")).ok()
}

impl From<&str> for Tags {
    fn from(raw: &str) -> Self {
        Tags::from_struct_tag(raw)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TAG INFO
// ————————————————————————————————————————————————————————————————————————————

/// Documentation metadata accumulated for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    pub doc_str: String,
    pub default: Option<String>,
    pub enum_values: Vec<String>,
    pub enum_idx: usize,         // always < enum_values.len() when non-empty
    pub required: bool,
    pub readonly: bool,
    pub empty_ok: bool,
}

impl TagInfo {
    /// Folds `tags` into `self`. `parent` is the struct declaring the field; enum
    /// bindings resolve their sibling field against it.
    pub fn parse(&mut self, tags: &Tags, parent: &StructTy) -> Result<(), TemplateError> {
        if let Some(doc) = tags.get(DOC) {
            self.doc_str = doc.to_string();
        }
        if let Some(default) = tags.get(DEFAULT) {
            self.default = (!default.is_empty()).then(|| default.to_string());
        }
        if let Some(flags) = tags.get(FLAGS) {
            for (index, flag) in flags.split(',').enumerate() {
                match flag.trim() {
                    "req" => {
                        self.required = true;
                        self.add_to_doc("Required.");
                    }
                    "ro" => {
                        self.readonly = true;
                        self.add_to_doc("Read only.");
                    }
                    "emptyok" => self.empty_ok = true,
                    other => {
                        return Err(TemplateError::UnknownFlag {
                            tag: flags.to_string(),
                            index,
                            flag: other.to_string(),
                        });
                    }
                }
            }
        }
        if let Some(binding) = tags.get(ENUM).filter(|b| !b.is_empty()) {
            self.bind_enum(binding, parent)?;
        }
        if self.default.is_none() {
            if let Some(value) = self.enum_values.get(self.enum_idx) {
                self.default = Some(serde_json::Value::from(value.as_str()).to_string());
            }
        }
        if !self.enum_values.is_empty() {
            let values = self.enum_values.join(", ");
            self.add_to_doc(&format!("Defined values are: {values}. "));
        }
        Ok(())
    }

    fn bind_enum(&mut self, tag: &str, parent: &StructTy) -> Result<(), TemplateError> {
        let parts = tag.split(',').collect::<Vec<_>>();
        let [sibling, index] = parts.as_slice() else {
            return Err(TemplateError::EnumArity { tag: tag.to_string() });
        };
        let index_text = index.trim();
        let index = index_text.parse::<i64>().map_err(|source| TemplateError::EnumIndex {
            index: index_text.to_string(),
            tag: tag.to_string(),
            source,
        })?;
        let sibling = sibling.trim();
        let field = parent
            .field_by_name(sibling)
            .ok_or_else(|| TemplateError::EnumFieldNotFound {
                field: sibling.to_string(),
                tag: tag.to_string(),
            })?;
        let values = enum_strings(&field.ty).ok_or_else(|| TemplateError::EnumCapabilityMissing {
            field: field.name.clone(),
            tag: tag.to_string(),
            ty: field.ty.strip_indirection().type_name(),
        })?;
        let max = values.len() as i64 - 1;
        if index < 0 || index > max {
            return Err(TemplateError::EnumIndexOutOfRange {
                field: field.name.clone(),
                tag: tag.to_string(),
                index,
                max,
            });
        }
        self.enum_values = values;
        self.enum_idx = index as usize;
        Ok(())
    }

    /// Appends a sentence, making sure the text so far ends in ". ".
    pub fn add_to_doc(&mut self, sentence: &str) {
        let kept = self.doc_str.trim_end().len();
        self.doc_str.truncate(kept);
        if !self.doc_str.is_empty() {
            if !self.doc_str.ends_with('.') {
                self.doc_str.push('.');
            }
            self.doc_str.push(' ');
        }
        self.doc_str.push_str(sentence);
    }

    /// Text for the trailing `/* */` comment, if there is any doc.
    pub fn comment(&self) -> Option<String> {
        let doc = self.doc_str.trim_end();
        if doc.is_empty() {
            return None;
        }
        let mut text = doc.replace("*/", "*\\/");
        if !text.ends_with('.') {
            text.push('.');
        }
        Some(text)
    }
}

/// Enum strings of a named type, value form first, then pointer form.
fn enum_strings(ty: &Ty) -> Option<Vec<String>> {
    let Ty::Named(named) = ty.strip_indirection() else {
        return None;
    };
    if let Some(source) = named.value_enum {
        return Some((source.0)());
    }
    debug!("looking up enum strings on the pointer form of {}", named.name);
    named.pointer_enum.map(|source| (source.0)())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::EnumStrings;

    #[derive(Default)]
    struct ResetAction;

    impl EnumStrings for ResetAction {
        fn enum_strings(&self) -> Vec<String> {
            ["No_Reset", "Reboot_Host", "Reset_Host_Power", "Reset_Motherboard_Power"]
                .map(String::from)
                .to_vec()
        }
    }

    #[derive(Default)]
    struct Nothing;

    impl EnumStrings for Nothing {
        fn enum_strings(&self) -> Vec<String> {
            Vec::new()
        }
    }

    fn parent() -> StructTy {
        Ty::structure("Group")
            .field("Name", Ty::String, "")
            .field("Reset", Ty::named("ResetAction", Ty::Int).with_enum::<ResetAction>(), "")
            .field("reset", Ty::pointer(Ty::named("ResetAction", Ty::Int).with_pointer_enum::<ResetAction>()), "")
            .field("Empty", Ty::named("Nothing", Ty::Int).with_enum::<Nothing>(), "")
    }

    fn parse(tags: Tags) -> Result<TagInfo, TemplateError> {
        let mut info = TagInfo::default();
        info.parse(&tags, &parent())?;
        Ok(info)
    }

    #[test]
    fn struct_tag_reads_pairs_and_escapes() {
        let tags = Tags::from_struct_tag(r#"doc:"a \"quoted\" word" default:"\"x\""  flags:"req""#);
        assert_eq!(tags.get(DOC), Some(r#"a "quoted" word"#));
        assert_eq!(tags.get(DEFAULT), Some(r#""x""#));
        assert_eq!(tags.get(FLAGS), Some("req"));
        assert_eq!(tags.get(ENUM), None);
    }

    #[test]
    fn struct_tag_stops_at_malformed_pair_and_keeps_first_duplicate() {
        let tags = Tags::from_struct_tag(r#"doc:"one" doc:"two" broken default:"0""#);
        assert_eq!(tags.get(DOC), Some("one"));
        assert_eq!(tags.get(DEFAULT), None);
        assert!(Tags::from_struct_tag("").is_empty());
    }

    #[test]
    fn doc_and_default_are_taken_verbatim() {
        let info = parse(Tags::new().doc("capacity").default_value("0")).unwrap();
        assert_eq!(info.doc_str, "capacity");
        assert_eq!(info.default.as_deref(), Some("0"));
        assert_eq!(info.comment().as_deref(), Some("capacity."));
    }

    #[test]
    fn empty_default_counts_as_absent() {
        let mut info = TagInfo { default: Some("1".into()), ..TagInfo::default() };
        info.parse(&Tags::new().default_value(""), &parent()).unwrap();
        assert_eq!(info.default, None);
    }

    #[test]
    fn flags_set_booleans_and_doc_sentences() {
        let info = parse(Tags::new().doc("name").flags(" req , ro,emptyok")).unwrap();
        assert!(info.required && info.readonly && info.empty_ok);
        assert_eq!(info.doc_str, "name. Required. Read only.");
    }

    #[test]
    fn unknown_flag_names_token_and_position() {
        let err = parse(Tags::new().flags("req, bogus")).unwrap_err();
        match &err {
            TemplateError::UnknownFlag { index, flag, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(flag, "bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("entry #1: undefined flag \"bogus\""));
    }

    #[test]
    fn enum_binding_synthesizes_default_and_doc() {
        let info = parse(Tags::new().doc("Reset after this").enum_binding("Reset", 1)).unwrap();
        assert_eq!(info.enum_idx, 1);
        assert_eq!(info.default.as_deref(), Some("\"Reboot_Host\""));
        assert_eq!(
            info.doc_str,
            "Reset after this. Defined values are: No_Reset, Reboot_Host, Reset_Host_Power, Reset_Motherboard_Power. "
        );
        assert_eq!(
            info.comment().as_deref(),
            Some("Reset after this. Defined values are: No_Reset, Reboot_Host, Reset_Host_Power, Reset_Motherboard_Power.")
        );
    }

    #[test]
    fn explicit_default_beats_enum_default() {
        let info = parse(Tags::new().default_value("\"No_Reset\"").enum_binding("Reset", 3)).unwrap();
        assert_eq!(info.default.as_deref(), Some("\"No_Reset\""));
        assert_eq!(info.enum_idx, 3);
    }

    #[test]
    fn enum_binding_falls_back_to_pointer_form() {
        let info = parse(Tags::from_struct_tag(r#"enum:"reset,0""#)).unwrap();
        assert_eq!(info.default.as_deref(), Some("\"No_Reset\""));
        assert_eq!(info.comment().as_deref(), Some(
            "Defined values are: No_Reset, Reboot_Host, Reset_Host_Power, Reset_Motherboard_Power."
        ));
    }

    #[test]
    fn enum_binding_errors() {
        let cases = [
            ("Reset", "2 comma-separated fields"),
            ("Reset,1,2", "2 comma-separated fields"),
            ("Reset,one", "failed to parse enum index \"one\""),
            ("Missing,0", "failed to get enum field \"Missing\""),
            ("Name,0", "type string provides no enum strings"),
            ("Reset,4", "index 4 out of range [0, 3]"),
            ("Reset,-1", "index -1 out of range [0, 3]"),
            ("Empty,0", "index 0 out of range [0, -1]"),
        ];
        for (binding, expected) in cases {
            let err = parse(Tags::new().with(ENUM, binding)).unwrap_err();
            assert!(err.to_string().contains(expected), "{binding}: {err}");
        }
    }

    #[test]
    fn empty_enum_annotation_is_ignored() {
        let info = parse(Tags::new().with(ENUM, "")).unwrap();
        assert!(info.enum_values.is_empty());
        assert_eq!(info.default, None);
    }

    #[test]
    fn add_to_doc_never_doubles_periods() {
        for start in ["first", "first.", "first.  ", "first \n"] {
            let mut info = TagInfo { doc_str: start.into(), ..TagInfo::default() };
            info.add_to_doc("Second.");
            assert_eq!(info.doc_str, "first. Second.");
        }
        let mut info = TagInfo::default();
        info.add_to_doc("Only.");
        assert_eq!(info.doc_str, "Only.");
    }

    #[test]
    fn comment_is_none_for_blank_docs_and_cannot_close_early() {
        assert_eq!(TagInfo { doc_str: "  ".into(), ..TagInfo::default() }.comment(), None);
        let info = TagInfo { doc_str: "a */ b".into(), ..TagInfo::default() };
        assert_eq!(info.comment().as_deref(), Some("a *\\/ b."));
    }

    #[test]
    fn baseline_is_kept_when_doc_is_absent() {
        let mut info = TagInfo { doc_str: "inherited".into(), default: Some("\"image:1\"".into()), ..TagInfo::default() };
        info.parse(&Tags::new().flags("ro"), &parent()).unwrap();
        assert_eq!(info.doc_str, "inherited. Read only.");
        assert_eq!(info.default.as_deref(), Some("\"image:1\""));
    }
}
