//! Offline name resolution over the parsed crate.
//!
//! Each module gets a scope holding the names it declares, its `use`
//! bindings and its glob imports. Paths written in attributes and macro
//! invocations are resolved against those scopes to a canonical
//! [`ItemPath`], following re-exports to the defining module, so that
//! identity comparisons never depend on how a marker was spelled.

use super::corpus::SourceCorpus;
use crate::core::{ItemPath, Origin, Resolution};
use crate::observability::{set_phase, ScanPhase};
use std::collections::{HashMap, HashSet};
use syn::{Item, UseTree};
use tracing::debug;

/// Guards against `use` cycles such as `use self::a as b; use self::b as a;`
const MAX_RESOLUTION_DEPTH: usize = 16;

/// Path written in a `use` declaration, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
struct UseTarget {
    segments: Vec<String>,
    leading_colon: bool,
}

#[derive(Debug, Default)]
struct ModuleScope {
    items: HashSet<String>,
    imports: HashMap<String, UseTarget>,
    globs: Vec<UseTarget>,
}

/// Scopes of every module in the crate, keyed by module path
#[derive(Debug, Default)]
pub struct SymbolTable {
    modules: HashMap<ItemPath, ModuleScope>,
    /// Items of other crates that may be reached through `use dep::*;`
    external_items: HashSet<ItemPath>,
}

impl SymbolTable {
    pub fn build(corpus: &SourceCorpus) -> Self {
        let _phase = set_phase(ScanPhase::SymbolResolution);
        let mut table = Self::default();
        for file in corpus.files() {
            table.collect_items(&file.module, &file.ast.items);
        }
        debug!(modules = table.modules.len(), "Built symbol table");
        table
    }

    /// Make items of other crates visible through glob imports.
    ///
    /// The contents of another crate are unknown, so a bare name imported
    /// with `use dep::*;` only resolves to `dep::name` when that path was
    /// registered here. Crate-local paths are ignored.
    #[must_use]
    pub fn with_external_items(mut self, items: impl IntoIterator<Item = ItemPath>) -> Self {
        self.external_items
            .extend(items.into_iter().filter(|path| !path.is_crate_local()));
        self
    }

    fn collect_items(&mut self, module: &ItemPath, items: &[Item]) {
        self.modules.entry(module.clone()).or_default();

        for item in items {
            match item {
                Item::Use(item_use) => {
                    let leading_colon = item_use.leading_colon.is_some();
                    self.collect_use(module, &item_use.tree, Vec::new(), leading_colon);
                }
                Item::ExternCrate(extern_crate) => {
                    let name = extern_crate.ident.to_string();
                    let binding = extern_crate
                        .rename
                        .as_ref()
                        .map(|(_, rename)| rename.to_string())
                        .unwrap_or_else(|| name.clone());
                    let target = if name == "self" {
                        UseTarget {
                            segments: vec![ItemPath::CRATE.to_string()],
                            leading_colon: false,
                        }
                    } else {
                        UseTarget {
                            segments: vec![name],
                            leading_colon: true,
                        }
                    };
                    self.scope_mut(module).imports.insert(binding, target);
                }
                Item::Mod(item_mod) => {
                    let name = item_mod.ident.to_string();
                    self.scope_mut(module).items.insert(name.clone());
                    if let Some((_, nested)) = &item_mod.content {
                        self.collect_items(&module.join(name), nested);
                    }
                }
                other => {
                    if let Some(name) = declared_name(other) {
                        self.scope_mut(module).items.insert(name);
                    }
                }
            }
        }
    }

    fn collect_use(
        &mut self,
        module: &ItemPath,
        tree: &UseTree,
        prefix: Vec<String>,
        leading_colon: bool,
    ) {
        match tree {
            UseTree::Path(path) => {
                let mut prefix = prefix;
                prefix.push(path.ident.to_string());
                self.collect_use(module, &path.tree, prefix, leading_colon);
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                let (binding, segments) = if ident == "self" {
                    match prefix.last() {
                        Some(last) => (last.clone(), prefix),
                        None => return,
                    }
                } else {
                    let mut segments = prefix;
                    segments.push(ident.clone());
                    (ident, segments)
                };
                self.bind(module, binding, segments, leading_colon);
            }
            UseTree::Rename(rename) => {
                let binding = rename.rename.to_string();
                if binding == "_" {
                    return;
                }
                let ident = rename.ident.to_string();
                let mut segments = prefix;
                if ident != "self" {
                    segments.push(ident);
                }
                self.bind(module, binding, segments, leading_colon);
            }
            UseTree::Glob(_) => {
                self.scope_mut(module).globs.push(UseTarget {
                    segments: prefix,
                    leading_colon,
                });
            }
            UseTree::Group(group) => {
                for tree in &group.items {
                    self.collect_use(module, tree, prefix.clone(), leading_colon);
                }
            }
        }
    }

    fn bind(
        &mut self,
        module: &ItemPath,
        binding: String,
        segments: Vec<String>,
        leading_colon: bool,
    ) {
        self.scope_mut(module).imports.insert(
            binding,
            UseTarget {
                segments,
                leading_colon,
            },
        );
    }

    fn scope_mut(&mut self, module: &ItemPath) -> &mut ModuleScope {
        self.modules.entry(module.clone()).or_default()
    }

    /// Whether a crate-local path names a declared item or module
    pub fn contains(&self, path: &ItemPath) -> bool {
        if self.modules.contains_key(path) {
            return true;
        }
        match path.parent() {
            Some(parent) => self
                .modules
                .get(&parent)
                .is_some_and(|scope| scope.items.contains(path.simple_name())),
            None => false,
        }
    }

    /// Resolve a path written inside `module`
    pub fn resolve(&self, module: &ItemPath, path: &syn::Path) -> Resolution {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        self.resolve_segments(module, &segments, path.leading_colon.is_some(), None, true, 0)
    }

    fn resolve_segments(
        &self,
        module: &ItemPath,
        segments: &[String],
        leading_colon: bool,
        skip_import: Option<&str>,
        through_globs: bool,
        depth: usize,
    ) -> Resolution {
        let Some((first, rest)) = segments.split_first() else {
            return Resolution::local(module.clone());
        };
        if leading_colon {
            return Resolution::external(ItemPath::new(segments));
        }
        if depth > MAX_RESOLUTION_DEPTH {
            return Resolution::unscoped(ItemPath::new(segments));
        }

        match first.as_str() {
            "crate" => return self.canonicalize(ItemPath::crate_root(), rest, depth),
            "self" => return self.canonicalize(module.clone(), rest, depth),
            "super" => {
                let mut base = module.parent().unwrap_or_else(ItemPath::crate_root);
                let mut rest = rest;
                while let Some((next, remaining)) = rest.split_first() {
                    if next != "super" {
                        break;
                    }
                    base = base.parent().unwrap_or_else(ItemPath::crate_root);
                    rest = remaining;
                }
                return self.canonicalize(base, rest, depth);
            }
            _ => {}
        }

        let scope = self.modules.get(module);
        if let Some(target) = scope
            .and_then(|s| s.imports.get(first))
            .filter(|_| skip_import != Some(first.as_str()))
        {
            let resolved = self.resolve_import(module, first, target, depth + 1);
            return self.append(resolved, rest, depth + 1);
        }

        if self.declares_locally(module, first) {
            return self.canonicalize(module.clone(), segments, depth);
        }

        if let Some(scope) = scope.filter(|_| through_globs) {
            if let Some(base) = self.find_through_globs(module, scope, first, depth) {
                return self.canonicalize(base, segments, depth);
            }
            if let Some(path) = self.find_through_external_globs(module, scope, segments, depth) {
                return Resolution::external(path);
            }
        }

        if rest.is_empty() {
            Resolution::unscoped(ItemPath::new(segments))
        } else {
            Resolution::external(ItemPath::new(segments))
        }
    }

    /// Walk `rest` down from a crate-local module, following re-exports
    fn canonicalize(&self, base: ItemPath, rest: &[String], depth: usize) -> Resolution {
        if depth > MAX_RESOLUTION_DEPTH {
            return Resolution::local(base.extend(rest));
        }

        let mut current = base;
        for (index, segment) in rest.iter().enumerate() {
            let Some(scope) = self.modules.get(&current) else {
                return Resolution::local(current.extend(&rest[index..]));
            };

            if self.declares_locally(&current, segment) {
                current = current.join(segment.clone());
                continue;
            }

            if let Some(target) = scope.imports.get(segment) {
                let resolved = self.resolve_import(&current, segment, target, depth + 1);
                return self.append(resolved, &rest[index + 1..], depth + 1);
            }

            if let Some(module) = self.find_through_globs(&current, scope, segment, depth) {
                return self.canonicalize(module, &rest[index..], depth + 1);
            }

            return Resolution::local(current.extend(&rest[index..]));
        }

        Resolution::local(current)
    }

    fn resolve_import(
        &self,
        module: &ItemPath,
        binding: &str,
        target: &UseTarget,
        depth: usize,
    ) -> Resolution {
        let resolved = self.resolve_segments(
            module,
            &target.segments,
            target.leading_colon,
            Some(binding),
            true,
            depth,
        );
        // Anything a `use` reaches outside this crate is another crate's item
        match resolved.origin {
            Origin::Unscoped => Resolution::external(resolved.path),
            _ => resolved,
        }
    }

    fn append(&self, resolved: Resolution, rest: &[String], depth: usize) -> Resolution {
        if rest.is_empty() {
            return resolved;
        }
        match resolved.origin {
            Origin::Local => self.canonicalize(resolved.path, rest, depth),
            _ => Resolution::external(resolved.path.extend(rest)),
        }
    }

    fn find_through_globs(
        &self,
        module: &ItemPath,
        scope: &ModuleScope,
        name: &str,
        depth: usize,
    ) -> Option<ItemPath> {
        scope.globs.iter().find_map(|glob| {
            let base = self.glob_base(module, glob, depth);
            let visible = base.origin == Origin::Local
                && (self.declares_locally(&base.path, name)
                    || self
                        .modules
                        .get(&base.path)
                        .is_some_and(|s| s.imports.contains_key(name)));
            visible.then_some(base.path)
        })
    }

    fn find_through_external_globs(
        &self,
        module: &ItemPath,
        scope: &ModuleScope,
        segments: &[String],
        depth: usize,
    ) -> Option<ItemPath> {
        if self.external_items.is_empty() {
            return None;
        }
        scope.globs.iter().find_map(|glob| {
            let base = self.glob_base(module, glob, depth);
            if base.origin == Origin::Local {
                return None;
            }
            let candidate = base.path.extend(segments);
            self.external_items.contains(&candidate).then_some(candidate)
        })
    }

    /// Module a glob import reads from. Glob bases are resolved without
    /// consulting other globs.
    fn glob_base(&self, module: &ItemPath, glob: &UseTarget, depth: usize) -> Resolution {
        self.resolve_segments(module, &glob.segments, glob.leading_colon, None, false, depth + 1)
    }

    fn declares_locally(&self, module: &ItemPath, name: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|scope| scope.items.contains(name))
            || self.modules.contains_key(&module.join(name))
    }
}

/// Name an item introduces into its module's namespace, if any
fn declared_name(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Struct(i) => &i.ident,
        Item::Enum(i) => &i.ident,
        Item::Union(i) => &i.ident,
        Item::Type(i) => &i.ident,
        Item::Trait(i) => &i.ident,
        Item::TraitAlias(i) => &i.ident,
        Item::Fn(i) => &i.sig.ident,
        Item::Const(i) => &i.ident,
        Item::Static(i) => &i.ident,
        Item::Mod(i) => &i.ident,
        Item::Macro(i) => i.ident.as_ref()?,
        _ => return None,
    };
    let name = ident.to_string();
    (name != "_").then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn table(sources: &[(&str, &str)]) -> SymbolTable {
        let corpus = SourceCorpus::from_sources(sources.iter().copied()).unwrap();
        SymbolTable::build(&corpus)
    }

    fn resolve(table: &SymbolTable, module: &str, path: &str) -> Resolution {
        let module = ItemPath::parse(module).unwrap();
        let path: syn::Path = syn::parse_str(path).unwrap();
        table.resolve(&module, &path)
    }

    #[test]
    fn test_local_item_resolves_relative_to_module() {
        let table = table(&[
            ("lib.rs", "mod markers;"),
            ("markers.rs", "pub struct Audited;"),
        ]);

        let resolution = resolve(&table, "crate::markers", "Audited");
        assert_eq!(resolution.origin, Origin::Local);
        assert_eq!(resolution.path.to_string(), "crate::markers::Audited");
    }

    #[test]
    fn test_use_and_rename_follow_to_definition() {
        let table = table(&[
            (
                "lib.rs",
                indoc! {r#"
                    mod markers;
                    mod api;
                "#},
            ),
            ("markers.rs", "pub struct Audited;"),
            (
                "api.rs",
                indoc! {r#"
                    use crate::markers::Audited;
                    use crate::markers::Audited as Logged;
                    use super::markers;
                "#},
            ),
        ]);

        let expected = "crate::markers::Audited";
        assert_eq!(resolve(&table, "crate::api", "Audited").path.to_string(), expected);
        assert_eq!(resolve(&table, "crate::api", "Logged").path.to_string(), expected);
        assert_eq!(
            resolve(&table, "crate::api", "markers::Audited").path.to_string(),
            expected
        );
        assert_eq!(
            resolve(&table, "crate::api", "crate::markers::Audited").path.to_string(),
            expected
        );
    }

    #[test]
    fn test_reexport_resolves_to_defining_module() {
        let table = table(&[
            (
                "lib.rs",
                indoc! {r#"
                    mod markers {
                        mod inner {
                            pub struct Audited;
                        }
                        pub use self::inner::Audited;
                    }
                "#},
            ),
        ]);

        let resolution = resolve(&table, "crate", "markers::Audited");
        assert_eq!(resolution.path.to_string(), "crate::markers::inner::Audited");
    }

    #[test]
    fn test_glob_import() {
        let table = table(&[
            ("lib.rs", "mod markers; mod api;"),
            ("markers.rs", "pub struct Audited; pub struct Cached;"),
            ("api.rs", "use crate::markers::*;"),
        ]);

        let resolution = resolve(&table, "crate::api", "Cached");
        assert_eq!(resolution.origin, Origin::Local);
        assert_eq!(resolution.path.to_string(), "crate::markers::Cached");
    }

    #[test]
    fn test_external_and_unscoped_paths() {
        let table = table(&[(
            "lib.rs",
            indoc! {r#"
                use functions_worker::function;
                use serde as codec;
            "#},
        )]);

        let imported = resolve(&table, "crate", "function");
        assert_eq!(imported.origin, Origin::External);
        assert_eq!(imported.path.to_string(), "functions_worker::function");

        let written = resolve(&table, "crate", "functions_worker::function");
        assert_eq!(written, imported);

        let renamed = resolve(&table, "crate", "codec::Serialize");
        assert_eq!(renamed.path.to_string(), "serde::Serialize");

        let builtin = resolve(&table, "crate", "inline");
        assert_eq!(builtin.origin, Origin::Unscoped);
        assert_eq!(builtin.path.to_string(), "inline");
    }

    #[test]
    fn test_external_glob_resolves_registered_items() {
        let table = table(&[(
            "lib.rs",
            indoc! {r#"
                use functions_worker::*;
                use audit_markers::*;
            "#},
        )])
        .with_external_items([
            ItemPath::new(["functions_worker", "function"]),
            ItemPath::new(["audit_markers", "Audited"]),
            ItemPath::new(["crate", "Local"]),
        ]);

        let function = resolve(&table, "crate", "function");
        assert_eq!(function.origin, Origin::External);
        assert_eq!(function.path.to_string(), "functions_worker::function");

        let audited = resolve(&table, "crate", "Audited");
        assert_eq!(audited.path.to_string(), "audit_markers::Audited");

        // Unknown names stay unscoped rather than guessing a crate
        assert_eq!(resolve(&table, "crate", "inline").origin, Origin::Unscoped);
    }

    #[test]
    fn test_external_glob_needs_registration() {
        let table = table(&[("lib.rs", "use functions_worker::*;")]);
        assert_eq!(resolve(&table, "crate", "function").origin, Origin::Unscoped);
    }

    #[test]
    fn test_many_external_globs_resolve_quickly() {
        let source: String = (0..12).map(|i| format!("use dep{i}::*;\n")).collect();
        let table = table(&[("lib.rs", source.as_str())])
            .with_external_items([ItemPath::new(["dep11", "Marker"])]);

        assert_eq!(resolve(&table, "crate", "Marker").path.to_string(), "dep11::Marker");
        assert_eq!(resolve(&table, "crate", "Other").origin, Origin::Unscoped);
    }

    #[test]
    fn test_same_name_in_different_modules_is_distinct() {
        let table = table(&[(
            "lib.rs",
            indoc! {r#"
                mod a { pub struct Marker; }
                mod b { pub struct Marker; }
            "#},
        )]);

        let a = resolve(&table, "crate::a", "Marker");
        let b = resolve(&table, "crate::b", "Marker");
        assert_ne!(a.path, b.path);
        assert_eq!(a.path.simple_name(), b.path.simple_name());
    }

    #[test]
    fn test_super_chain() {
        let table = table(&[(
            "lib.rs",
            indoc! {r#"
                pub struct Top;
                mod a { mod b { } }
            "#},
        )]);

        let resolution = resolve(&table, "crate::a::b", "super::super::Top");
        assert_eq!(resolution.path.to_string(), "crate::Top");
    }

    #[test]
    fn test_import_cycle_terminates() {
        let table = table(&[(
            "lib.rs",
            indoc! {r#"
                use self::a as b;
                use self::b as a;
            "#},
        )]);

        // Only needs to return; the identity of a cyclic import is meaningless
        let _ = resolve(&table, "crate", "a::Thing");
    }

    #[test]
    fn test_self_named_import_is_external() {
        let table = table(&[("lib.rs", "use tracing::tracing;")]);
        let resolution = resolve(&table, "crate", "tracing");
        assert_eq!(resolution.origin, Origin::External);
        assert_eq!(resolution.path.to_string(), "tracing::tracing");
    }

    #[test]
    fn test_contains() {
        let table = table(&[
            ("lib.rs", "mod markers;"),
            ("markers.rs", "pub struct Audited;"),
        ]);

        assert!(table.contains(&ItemPath::parse("crate::markers::Audited").unwrap()));
        assert!(table.contains(&ItemPath::parse("crate::markers").unwrap()));
        assert!(!table.contains(&ItemPath::parse("crate::markers::Missing").unwrap()));
    }
}
