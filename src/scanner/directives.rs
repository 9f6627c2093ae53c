//! Directive registry: which marker items the crate asks to group by.
//!
//! A directive is an item macro at the top level of the crate root:
//!
//! ```ignore
//! markscan::generate_functions_with!(crate::markers::Custom);
//! ```

use super::corpus::{SourceCorpus, SourceFile};
use super::symbols::SymbolTable;
use crate::config::GeneratorSettings;
use crate::core::{Error, Grouping, ItemPath, Origin, Resolution, Result};
use crate::observability::{set_current_file, set_phase, ScanPhase};
use std::collections::HashSet;
use syn::{Item, ItemMacro};
use tracing::{debug, info};

/// Collect the distinct groupings in first-seen order
pub fn collect(
    corpus: &SourceCorpus,
    symbols: &SymbolTable,
    settings: &GeneratorSettings,
) -> Result<Vec<Grouping>> {
    let _phase = set_phase(ScanPhase::DirectiveCollection);
    let Some(root) = corpus.crate_root() else {
        return Ok(Vec::new());
    };
    let _file = set_current_file(&root.path);

    let mut seen = HashSet::new();
    let mut groupings = Vec::new();

    for item in &root.ast.items {
        let Item::Macro(item_macro) = item else {
            continue;
        };
        // `macro_rules! name { .. }` definitions carry an ident
        if item_macro.ident.is_some() {
            continue;
        }
        let invoked = symbols.resolve(&root.module, &item_macro.mac.path);
        if !is_directive(&invoked, &settings.directive_macro) {
            continue;
        }

        let marker = resolve_argument(root, symbols, item_macro)?;
        if seen.insert(marker.clone()) {
            debug!(marker = %marker, "Grouping directive");
            groupings.push(Grouping::new(marker));
        } else {
            debug!(marker = %marker, "Redundant grouping directive");
        }
    }

    info!(groupings = groupings.len(), "Collected grouping directives");
    Ok(groupings)
}

/// The configured macro, or its bare name in `#[macro_use]` textual scope
fn is_directive(invoked: &Resolution, directive: &ItemPath) -> bool {
    &invoked.path == directive
        || (invoked.origin == Origin::Unscoped
            && invoked.path.simple_name() == directive.simple_name())
}

fn resolve_argument(
    root: &SourceFile,
    symbols: &SymbolTable,
    item_macro: &ItemMacro,
) -> Result<ItemPath> {
    let line = item_macro.mac.path.segments.first().map_or(0, |s| s.ident.span().start().line);

    let argument: syn::Path = item_macro.mac.parse_body().map_err(|e| Error::MalformedDirective {
        file: root.path.clone(),
        line,
        message: format!("expected exactly one marker path: {e}"),
    })?;
    if argument.segments.iter().any(|s| !s.arguments.is_none()) {
        return Err(Error::MalformedDirective {
            file: root.path.clone(),
            line,
            message: "marker path must not have generic arguments".to_string(),
        });
    }

    let resolution = symbols.resolve(&root.module, &argument);
    let known = match resolution.origin {
        Origin::Local => symbols.contains(&resolution.path),
        Origin::External => true,
        Origin::Unscoped => false,
    };
    if !known {
        return Err(Error::UnresolvedDirective {
            file: root.path.clone(),
            line,
            path: written_path(&argument),
        });
    }
    Ok(resolution.path)
}

fn written_path(path: &syn::Path) -> String {
    let joined = path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::");
    if path.leading_colon.is_some() {
        format!("::{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn collect_from(sources: &[(&str, &str)]) -> Result<Vec<Grouping>> {
        let corpus = SourceCorpus::from_sources(sources.iter().copied()).unwrap();
        let symbols = SymbolTable::build(&corpus);
        collect(&corpus, &symbols, &GeneratorSettings::default())
    }

    fn markers(groupings: &[Grouping]) -> Vec<String> {
        groupings.iter().map(|g| g.marker.to_string()).collect()
    }

    #[test]
    fn test_directives_in_declaration_order() {
        let groupings = collect_from(&[(
            "lib.rs",
            indoc! {r#"
                markscan::generate_functions_with!(markers::Custom);
                markscan::generate_functions_with!(markers::OtherCustom);

                mod markers {
                    pub struct Custom;
                    pub struct OtherCustom;
                }
            "#},
        )])
        .unwrap();

        assert_eq!(
            markers(&groupings),
            vec!["crate::markers::Custom", "crate::markers::OtherCustom"]
        );
    }

    #[test]
    fn test_duplicate_identity_collapses() {
        let groupings = collect_from(&[(
            "lib.rs",
            indoc! {r#"
                use markers::Custom;
                markscan::generate_functions_with!(Custom);
                markscan::generate_functions_with!(markers::Other);
                markscan::generate_functions_with!(crate::markers::Custom);

                mod markers {
                    pub struct Custom;
                    pub struct Other;
                }
            "#},
        )])
        .unwrap();

        assert_eq!(
            markers(&groupings),
            vec!["crate::markers::Custom", "crate::markers::Other"]
        );
    }

    #[test]
    fn test_imported_and_macro_use_forms() {
        let groupings = collect_from(&[(
            "lib.rs",
            indoc! {r#"
                use markscan::generate_functions_with;
                generate_functions_with!(audit::Audited);
            "#},
        )])
        .unwrap();
        assert_eq!(markers(&groupings), vec!["audit::Audited"]);

        let groupings = collect_from(&[(
            "lib.rs",
            indoc! {r#"
                #[macro_use]
                extern crate markscan;
                pub struct Tag;
                generate_functions_with!(Tag);
            "#},
        )])
        .unwrap();
        assert_eq!(markers(&groupings), vec!["crate::Tag"]);
    }

    #[test]
    fn test_no_directives_is_empty() {
        let groupings =
            collect_from(&[("lib.rs", "pub struct Tag; println!(\"not a directive\");")]).unwrap();
        assert!(groupings.is_empty());
    }

    #[test]
    fn test_directives_outside_crate_root_are_ignored() {
        let groupings = collect_from(&[
            ("lib.rs", "mod inner; pub struct Tag;"),
            ("inner.rs", "markscan::generate_functions_with!(crate::Tag);"),
        ])
        .unwrap();
        assert!(groupings.is_empty());
    }

    #[test]
    fn test_unresolvable_local_marker_is_an_error() {
        let err = collect_from(&[(
            "lib.rs",
            "\nmarkscan::generate_functions_with!(crate::markers::Missing);",
        )])
        .unwrap_err();

        match err {
            Error::UnresolvedDirective { line, path, .. } => {
                assert_eq!(line, 2);
                assert_eq!(path, "crate::markers::Missing");
            }
            other => panic!("Expected unresolved directive, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_bare_marker_is_an_error() {
        let err = collect_from(&[("lib.rs", "markscan::generate_functions_with!(Nowhere);")])
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedDirective { .. }));
    }

    #[test]
    fn test_malformed_arguments_are_errors() {
        for body in ["", "\"Custom\"", "A, B", "Vec<u8>"] {
            let source = format!(
                "pub struct A; pub struct B; markscan::generate_functions_with!({body});"
            );
            let err = collect_from(&[("lib.rs", source.as_str())]).unwrap_err();
            assert!(
                matches!(err, Error::MalformedDirective { .. }),
                "`{body}` should be rejected, got {err:?}"
            );
        }
    }
}
