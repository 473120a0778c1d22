//! Hardware component metadata, the document the firmware catalog consumes.
//!
//! Each type is an ordinary serde model plus a [`Describe`] impl that carries the
//! per-field annotations the template is documented with.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::describe::{Describe, EnumStrings};
use crate::ir::Ty;

/// What to reset once an update has been applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ResetAction {
    #[default]
    #[serde(rename = "No_Reset")]
    None,
    #[serde(rename = "Reboot_Host")]
    Reboot,
    #[serde(rename = "Reset_Host_Power")]
    HostPowerCycle,
    #[serde(rename = "Reset_Motherboard_Power")]
    MotherboardPowerCycle,
}

impl ResetAction {
    pub const ALL: [ResetAction; 4] = [
        ResetAction::None,
        ResetAction::Reboot,
        ResetAction::HostPowerCycle,
        ResetAction::MotherboardPowerCycle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResetAction::None => "No_Reset",
            ResetAction::Reboot => "Reboot_Host",
            ResetAction::HostPowerCycle => "Reset_Host_Power",
            ResetAction::MotherboardPowerCycle => "Reset_Motherboard_Power",
        }
    }
}

impl EnumStrings for ResetAction {
    fn enum_strings(&self) -> Vec<String> {
        Self::ALL.iter().map(|a| a.as_str().to_string()).collect()
    }
}

impl Describe for ResetAction {
    fn describe() -> Ty {
        Ty::named("ResetAction", Ty::String).with_pointer_enum::<Self>().into()
    }
}

/// UTC timestamp in the form `YYYYMMDDThhmmssZ`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimestampUtc(pub String);

impl Describe for TimestampUtc {
    fn describe() -> Ty {
        // wall clock internals, none of them visible in the document
        let time = Ty::structure("Time")
            .field("wall", Ty::Uint, "")
            .field("ext", Ty::Int, "")
            .field("loc", Ty::pointer(Ty::structure("Location")), "");
        Ty::structure("TimestampUTC").embed(time, "").into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FormatInfo {
    pub format_version: String,
}

impl Describe for FormatInfo {
    fn describe() -> Ty {
        // `format` and `version` are the parsed halves, kept out of the document
        Ty::structure("FormatInfo")
            .field("FormatVersion", String::describe(), r#"doc:"string representing format:version""#)
            .field("format", String::describe(), "")
            .field("version", i32::describe(), "")
            .into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Info {
    pub description: String,
    pub last_changed: TimestampUtc,
    pub changed_by: String,
    pub cmd: CmdOptionInfo,
}

impl Describe for Info {
    fn describe() -> Ty {
        Ty::structure("Info")
            .field("Description", String::describe(), r#"doc:"description""#)
            .field(
                "LastChanged",
                TimestampUtc::describe(),
                r#"doc:"last modified timestamp in the format of YYYYMMDDThhmmssZ" default:"\"20200123T123456Z\"""#,
            )
            .field("ChangedBy", String::describe(), r#"doc:"last changed by (person)""#)
            .field("Cmd", CmdOptionInfo::describe(), r#"doc:"strange command""#)
            .into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CmdOptionInfo {
    pub name: String,
    pub after: Vec<String>,
}

impl Describe for CmdOptionInfo {
    fn describe() -> Ty {
        Ty::structure("CmdOptionInfo")
            .field("Name", String::describe(), r#"doc:"command option name (can be a template string)""#)
            .field("After", <Vec<String>>::describe(), r#"doc:"option(s) preceed this command option""#)
            .into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupInfo {
    pub name: String,
    pub order: Vec<String>,
    /// Template string evaluating to one of the [`ResetAction`] names.
    pub reset_after: String,
}

impl Describe for GroupInfo {
    fn describe() -> Ty {
        Ty::structure("GroupInfo")
            .field("Name", String::describe(), r#"doc:"name of the update group""#)
            .field(
                "Order",
                <Vec<String>>::describe(),
                r#"doc:"list of template strings evaluated to component type in update order""#,
            )
            .field(
                "ResetAfter",
                String::describe(),
                r#"doc:"template string evaluates to the reset action (immediately after the group update) string" enum:"resetAfter,0""#,
            )
            // evaluated action, only there to carry the enum strings
            .field("resetAfter", ResetAction::describe(), "")
            .into()
    }
}

/// Capability name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapMap(pub BTreeMap<String, i64>);

impl Describe for CapMap {
    fn describe() -> Ty {
        Ty::named("CapMap", <BTreeMap<String, i64>>::describe()).into()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JsonBool(pub i32);

impl Describe for JsonBool {
    fn describe() -> Ty {
        Ty::named("JSONBool", i32::describe()).into()
    }
}

/// Root of a component metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Component {
    #[serde(flatten)]
    pub format: FormatInfo,
    #[serde(flatten)]
    pub info: Info,
    #[serde(rename = "Type")]
    pub component_type: String,
    pub model: String,
    #[serde(rename = "DeviceID")]
    pub device_id: String,
    pub force_option: CmdOptionInfo,
    pub capacity: i64,
    pub reset_by_exit_codes: Vec<JsonBool>,
    pub capability: CapMap,
    pub groups: Vec<Vec<GroupInfo>>,
    pub reset_after: ResetAction,
}

impl Describe for Component {
    fn describe() -> Ty {
        Ty::structure("Component")
            .embed(FormatInfo::describe(), r#"default:"\"image:1\"""#)
            .embed(Info::describe(), "")
            .field("Type", String::describe(), r#"doc:"component type string""#)
            .field("Model", String::describe(), r#"doc:"component model string""#)
            .field("DeviceID", String::describe(), r#"doc:"template string to get device ID""#)
            .field("ForceOption", CmdOptionInfo::describe(), r#"doc:"information for the forced command option""#)
            .field("Capacity", i64::describe(), r#"doc:"capacity in Watts (integer)""#)
            .field("ResetByExitCodes", <Vec<JsonBool>>::describe(), r#"doc:"a list of exit codes to trigger ResetAfter""#)
            .field("Capability", CapMap::describe(), r#"doc:"capability map of key:value""#)
            .field("Groups", <Vec<Vec<GroupInfo>>>::describe(), r#"doc:"group update info""#)
            .field("ResetAfter", ResetAction::describe(), r#"doc:"Reset after this" enum:"ResetAfter,1""#)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::template_for;

    const COMPONENT_TEMPLATE: &str = r#"{
  "FormatVersion": "image:1", /* string representing format:version. */
  "Description": "", /* description. */
  "LastChanged": "20200123T123456Z", /* last modified timestamp in the format of YYYYMMDDThhmmssZ. */
  "ChangedBy": "", /* last changed by (person). */
  "Cmd": {
    "Name": "", /* command option name (can be a template string). */
    "After": [""] /* option(s) preceed this command option. */
  }, /* strange command. */
  "Type": "", /* component type string. */
  "Model": "", /* component model string. */
  "DeviceID": "", /* template string to get device ID. */
  "ForceOption": {
    "Name": "", /* command option name (can be a template string). */
    "After": [""] /* option(s) preceed this command option. */
  }, /* information for the forced command option. */
  "Capacity": 0, /* capacity in Watts (integer). */
  "ResetByExitCodes": [0], /* a list of exit codes to trigger ResetAfter. */
  "Capability": {"":0}, /* capability map of key:value. */
  "Groups": [[{
    "Name": "", /* name of the update group. */
    "Order": [""], /* list of template strings evaluated to component type in update order. */
    "ResetAfter": "No_Reset" /* template string evaluates to the reset action (immediately after the group update) string. Defined values are: No_Reset, Reboot_Host, Reset_Host_Power, Reset_Motherboard_Power. */
  }]], /* group update info. */
  "ResetAfter": "Reboot_Host" /* Reset after this. Defined values are: No_Reset, Reboot_Host, Reset_Host_Power, Reset_Motherboard_Power. */
}"#;

    #[test]
    fn component_template_matches_golden() {
        assert_eq!(template_for::<Component>().unwrap(), COMPONENT_TEMPLATE);
    }

    #[test]
    fn template_keys_cover_the_serialized_document() {
        let template = template_for::<Component>().unwrap();
        let doc = serde_json::to_value(Component::default()).unwrap();
        let keys = doc.as_object().unwrap().keys().collect::<Vec<_>>();
        assert_eq!(keys.len(), 14);
        for key in keys {
            assert!(template.contains(&format!("\n  \"{key}\": ")), "missing {key}");
        }
    }

    #[test]
    fn reset_action_strings_follow_declaration_order() {
        let strings = ResetAction::default().enum_strings();
        assert_eq!(strings, ["No_Reset", "Reboot_Host", "Reset_Host_Power", "Reset_Motherboard_Power"]);
        for action in ResetAction::ALL {
            assert_eq!(serde_json::to_value(action).unwrap(), action.as_str());
        }
    }

    #[test]
    fn hidden_fields_are_described_but_never_serialized() {
        for (ty, hidden) in [(FormatInfo::describe(), ["format", "version"].as_slice()), (GroupInfo::describe(), ["resetAfter"].as_slice())] {
            let Ty::Struct(st) = ty else { panic!("not a struct") };
            for name in hidden {
                assert!(st.field_by_name(name).is_some_and(|f| !f.is_visible()), "{name}");
            }
        }
        let format = serde_json::to_value(FormatInfo::default()).unwrap();
        assert_eq!(format, serde_json::json!({ "FormatVersion": "" }));
        let group = serde_json::to_value(GroupInfo::default()).unwrap();
        assert_eq!(group.as_object().unwrap().len(), 3);
    }

    #[test]
    fn reset_action_strings_live_on_the_pointer_form() {
        let Ty::Named(named) = ResetAction::describe() else { panic!("not a named type") };
        assert!(named.value_enum.is_none());
        assert_eq!(named.pointer_enum.map(|source| (source.0)().len()), Some(4));
    }
}
