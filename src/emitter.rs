//! Rendering a classification result as Rust source.
//!
//! The layout is fixed so that the output is byte-for-byte reproducible:
//!
//! ```text
//! // @generated by markscan. Do not edit.
//!
//! pub mod functions_attributes {
//!     pub struct GenerateFunctionsWith;
//!
//!     #[allow(non_upper_case_globals)]
//!     impl GenerateFunctionsWith {
//!         /// Registration names of functions marked `#[crate::markers::Custom]`.
//!         pub const Custom: &'static [&'static str] = &[
//!             "MyFunction",
//!         ];
//!     }
//! }
//! ```

use crate::config::GeneratorSettings;
use crate::core::{ClassificationResult, Error, GroupEntry, ItemPath, Result};
use crate::observability::{set_phase, ScanPhase};
use std::collections::HashMap;

pub const GENERATED_HEADER: &str = "// @generated by markscan. Do not edit.";

const INDENT: &str = "    ";

pub struct Emitter {
    namespace: String,
    container: String,
}

impl Emitter {
    pub fn new(namespace: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            container: container.into(),
        }
    }

    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        Self::new(settings.namespace.clone(), settings.container.clone())
    }

    /// Render the bindings, or nothing when no grouping was requested
    pub fn emit(&self, result: &ClassificationResult) -> Result<Option<String>> {
        let _phase = set_phase(ScanPhase::Emission);
        if result.is_empty() {
            return Ok(None);
        }
        check_binding_names(result)?;

        let mut out = String::new();
        push_line(&mut out, 0, GENERATED_HEADER);
        out.push('\n');
        push_line(&mut out, 0, &format!("pub mod {} {{", self.namespace));
        push_line(&mut out, 1, &format!("pub struct {};", self.container));
        out.push('\n');
        push_line(&mut out, 1, "#[allow(non_upper_case_globals)]");
        push_line(&mut out, 1, &format!("impl {} {{", self.container));

        for (index, entry) in result.entries.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            push_binding(&mut out, entry);
        }

        push_line(&mut out, 1, "}");
        push_line(&mut out, 0, "}");
        Ok(Some(out))
    }
}

fn push_binding(out: &mut String, entry: &GroupEntry) {
    let name = entry.grouping.binding_name();
    push_line(
        out,
        2,
        &format!(
            "/// Registration names of functions marked `#[{}]`.",
            entry.grouping.marker
        ),
    );

    if entry.names.is_empty() {
        push_line(out, 2, &format!("pub const {}: &'static [&'static str] = &[];", name));
        return;
    }

    push_line(out, 2, &format!("pub const {}: &'static [&'static str] = &[", name));
    for registration_name in &entry.names {
        push_line(out, 3, &format!("{},", string_literal(registration_name)));
    }
    push_line(out, 2, "];");
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

/// A Rust string literal whose value is exactly `value`
pub fn string_literal(value: &str) -> String {
    format!("{:?}", value)
}

/// Two distinct groupings must not share a binding name
fn check_binding_names(result: &ClassificationResult) -> Result<()> {
    let mut seen: HashMap<&str, &ItemPath> = HashMap::new();
    for entry in &result.entries {
        let marker = &entry.grouping.marker;
        if let Some(first) = seen.insert(entry.grouping.binding_name(), marker) {
            if first != marker {
                return Err(Error::BindingCollision {
                    name: entry.grouping.binding_name().to_string(),
                    first: first.to_string(),
                    second: marker.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Grouping;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn entry(marker: &[&str], names: &[&str]) -> GroupEntry {
        GroupEntry {
            grouping: Grouping::new(ItemPath::new(marker.iter().copied())),
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn emitter() -> Emitter {
        Emitter::from_settings(&GeneratorSettings::default())
    }

    #[test]
    fn test_emit_layout() {
        let result = ClassificationResult {
            entries: vec![
                entry(&["crate", "markers", "Custom"], &["MyFunction"]),
                entry(
                    &["crate", "markers", "OtherCustom"],
                    &["MyFunction", "MyOtherFunction"],
                ),
                entry(&["crate", "markers", "Unused"], &[]),
            ],
        };

        let text = emitter().emit(&result).unwrap().unwrap();

        assert_eq!(
            text,
            indoc! {r#"
                // @generated by markscan. Do not edit.

                pub mod functions_attributes {
                    pub struct GenerateFunctionsWith;

                    #[allow(non_upper_case_globals)]
                    impl GenerateFunctionsWith {
                        /// Registration names of functions marked `#[crate::markers::Custom]`.
                        pub const Custom: &'static [&'static str] = &[
                            "MyFunction",
                        ];

                        /// Registration names of functions marked `#[crate::markers::OtherCustom]`.
                        pub const OtherCustom: &'static [&'static str] = &[
                            "MyFunction",
                            "MyOtherFunction",
                        ];

                        /// Registration names of functions marked `#[crate::markers::Unused]`.
                        pub const Unused: &'static [&'static str] = &[];
                    }
                }
            "#}
        );
    }

    #[test]
    fn test_no_groupings_emits_nothing() {
        assert_eq!(emitter().emit(&ClassificationResult::default()).unwrap(), None);
    }

    #[test]
    fn test_custom_namespace_and_container() {
        let result = ClassificationResult {
            entries: vec![entry(&["crate", "Tag"], &["a"])],
        };
        let text = Emitter::new("generated", "Registry").emit(&result).unwrap().unwrap();
        assert!(text.contains("pub mod generated {"));
        assert!(text.contains("impl Registry {"));
    }

    #[test]
    fn test_simple_name_collision_is_an_error() {
        let result = ClassificationResult {
            entries: vec![
                entry(&["crate", "a", "Audited"], &["x"]),
                entry(&["crate", "b", "Audited"], &["y"]),
            ],
        };

        let err = emitter().emit(&result).unwrap_err();
        match err {
            Error::BindingCollision { name, first, second } => {
                assert_eq!(name, "Audited");
                assert_eq!(first, "crate::a::Audited");
                assert_eq!(second, "crate::b::Audited");
            }
            other => panic!("Expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("plain"), "\"plain\"");
        assert_eq!(string_literal("say \"hi\"\\"), r#""say \"hi\"\\""#);
        assert_eq!(string_literal("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn test_emit_is_deterministic() {
        let result = ClassificationResult {
            entries: vec![
                entry(&["crate", "Tag"], &["b", "a", "b"]),
                entry(&["crate", "Other"], &[]),
            ],
        };
        let first = emitter().emit(&result).unwrap();
        let second = emitter().emit(&result).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_emitted_source_parses() {
        let result = ClassificationResult {
            entries: vec![entry(
                &["functions_worker", "Custom"],
                &["with \"quotes\"", "ünïcode"],
            )],
        };
        let text = emitter().emit(&result).unwrap().unwrap();
        let file = syn::parse_file(&text).unwrap();
        assert_eq!(file.items.len(), 1);
    }
}
