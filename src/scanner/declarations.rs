//! Declaration store: every attributed function in the crate.
//!
//! Attribute paths are resolved through the symbol table, so the recorded
//! markers are item identities rather than spellings. Nothing here knows
//! which groupings were requested.

use super::corpus::SourceCorpus;
use super::symbols::SymbolTable;
use crate::core::{ItemPath, MethodDeclaration};
use crate::observability::{set_current_file, set_phase, ScanPhase};
use quote::ToTokens;
use std::path::Path;
use syn::ext::IdentExt;
use syn::visit::{self, Visit};
use syn::{AttrStyle, Attribute, Ident, Item, ItemFn, ItemImpl, ItemMod, ItemTrait};
use tracing::{debug, info};

/// Scan the whole corpus, in file order then source order
pub fn scan(
    corpus: &SourceCorpus,
    symbols: &SymbolTable,
    registration: &ItemPath,
) -> Vec<MethodDeclaration> {
    let _phase = set_phase(ScanPhase::DeclarationScan);
    let mut declarations = Vec::new();

    for file in corpus.files() {
        let _file = set_current_file(&file.path);
        let mut collector = DeclarationCollector {
            symbols,
            registration,
            file: &file.path,
            module: file.module.clone(),
            owner: None,
            declarations: &mut declarations,
        };
        collector.visit_file(&file.ast);
    }

    info!(
        declarations = declarations.len(),
        registered = declarations
            .iter()
            .filter(|d| d.registration_name.is_some())
            .count(),
        "Scanned attributed functions"
    );
    declarations
}

/// Literal name carried by a registration attribute: `#[function("Name")]`.
///
/// Any other shape yields `None`; the function is then left out of every
/// grouping rather than failing the build.
pub fn registration_argument(attr: &Attribute) -> Option<String> {
    attr.parse_args::<syn::LitStr>().ok().map(|lit| lit.value())
}

struct DeclarationCollector<'a> {
    symbols: &'a SymbolTable,
    registration: &'a ItemPath,
    file: &'a Path,
    module: ItemPath,
    /// Self type of the enclosing impl, or the enclosing trait
    owner: Option<String>,
    declarations: &'a mut Vec<MethodDeclaration>,
}

impl DeclarationCollector<'_> {
    fn record(&mut self, attrs: &[Attribute], ident: &Ident) {
        let markers_written: Vec<&Attribute> = attrs
            .iter()
            .filter(|attr| matches!(attr.style, AttrStyle::Outer) && !attr.path().is_ident("doc"))
            .collect();
        if markers_written.is_empty() {
            return;
        }

        let mut markers: Vec<ItemPath> = Vec::with_capacity(markers_written.len());
        let mut registration_name = None;
        let mut registration_seen = false;

        for attr in markers_written {
            let resolved = self.symbols.resolve(&self.module, attr.path()).path;

            if &resolved == self.registration && !registration_seen {
                registration_seen = true;
                registration_name = registration_argument(attr);
                if registration_name.is_none() {
                    debug!(
                        file = %self.file.display(),
                        function = %ident,
                        "Registration marker without a string literal argument; ignoring"
                    );
                }
            }

            if !markers.contains(&resolved) {
                markers.push(resolved);
            }
        }

        self.declarations.push(MethodDeclaration {
            module: self.module.clone(),
            owner: self.owner.clone(),
            name: ident.unraw().to_string(),
            file: self.file.to_path_buf(),
            line: ident.span().start().line,
            markers,
            registration_name,
        });
    }

    fn with_owner(&mut self, owner: String, visit: impl FnOnce(&mut Self)) {
        let previous = self.owner.replace(owner);
        visit(self);
        self.owner = previous;
    }
}

impl<'ast> Visit<'ast> for DeclarationCollector<'_> {
    fn visit_item(&mut self, item: &'ast Item) {
        // Only items that can hold functions; bodies and expressions are never entered
        match item {
            Item::Fn(_) | Item::Impl(_) | Item::Trait(_) | Item::Mod(_) => {
                visit::visit_item(self, item)
            }
            _ => {}
        }
    }

    fn visit_item_mod(&mut self, item: &'ast ItemMod) {
        if let Some((_, items)) = &item.content {
            let child = self.module.join(item.ident.to_string());
            let parent = std::mem::replace(&mut self.module, child);
            let owner = self.owner.take();
            for nested in items {
                self.visit_item(nested);
            }
            self.module = parent;
            self.owner = owner;
        }
    }

    fn visit_item_fn(&mut self, item: &'ast ItemFn) {
        self.record(&item.attrs, &item.sig.ident);
    }

    fn visit_item_impl(&mut self, item: &'ast ItemImpl) {
        self.with_owner(impl_owner(item), |this| {
            for impl_item in &item.items {
                if let syn::ImplItem::Fn(method) = impl_item {
                    this.record(&method.attrs, &method.sig.ident);
                }
            }
        });
    }

    fn visit_item_trait(&mut self, item: &'ast ItemTrait) {
        self.with_owner(item.ident.unraw().to_string(), |this| {
            for trait_item in &item.items {
                if let syn::TraitItem::Fn(method) = trait_item {
                    this.record(&method.attrs, &method.sig.ident);
                }
            }
        });
    }
}

/// `Type` for inherent impls, `<Type as Trait>` for trait impls
fn impl_owner(item: &ItemImpl) -> String {
    let self_ty = item.self_ty.to_token_stream().to_string();
    match &item.trait_ {
        Some((_, trait_path, _)) => {
            format!("<{} as {}>", self_ty, trait_path.to_token_stream())
        }
        None => self_ty,
    }
}
