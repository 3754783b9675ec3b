//! Export table construction.
//!
//! The table maps a file's local symbol names to their final scoped
//! identifiers: root (accumulating theme roots), classes (accumulating
//! extends then compose targets), var values, and scoped keyframe names.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::FileKey;
use crate::semantic::meta::{Meta, ROOT};
use crate::semantic::resolver::{MetaProvider, Resolution, Resolver};
use crate::semantic::symbols::{ImportTarget, StSymbol};
use crate::semantic::types::{Diagnostic, DiagnosticCollector, codes};

pub(super) fn build_exports(
    meta: &Arc<Meta>,
    files: &dyn MetaProvider,
    resolver: &Resolver<'_>,
    resolve_var: &mut dyn FnMut(&str, &mut DiagnosticCollector) -> Option<String>,
    diagnostics: &mut DiagnosticCollector,
) -> IndexMap<String, String> {
    let mut exports = IndexMap::new();

    let mut visited_roots = FxHashSet::default();
    exports.insert(
        ROOT.to_string(),
        root_export(meta, files, &mut visited_roots),
    );

    for name in &meta.classes {
        if name == ROOT {
            continue;
        }
        let mut visited = FxHashSet::default();
        if let Some(value) = class_export(meta, name, resolver, &mut visited, diagnostics) {
            exports.insert(name.to_string(), value);
        }
    }

    for var in &meta.vars {
        if let Some(value) = resolve_var(&var.name, diagnostics) {
            exports.insert(var.name.to_string(), value);
        }
    }

    for keyframe in &meta.keyframes {
        if exports.contains_key(keyframe.as_str()) {
            diagnostics.add(
                Diagnostic::warning(format!(
                    "keyframes '{keyframe}' clashes with an exported symbol"
                ))
                .with_code(codes::EXPORT_COLLISION),
            );
            continue;
        }
        exports.insert(keyframe.to_string(), meta.scoped_name(keyframe));
    }

    exports
}

/// Own scoped root plus, per `theme:true` import, the target's root export.
/// Recursion gives multi-level theme composition; the visited set makes
/// theme cycles terminate.
fn root_export(meta: &Arc<Meta>, files: &dyn MetaProvider, visited: &mut FxHashSet<FileKey>) -> String {
    let mut parts = vec![meta.scoped_root()];
    if !visited.insert(meta.source.clone()) {
        return parts.join(" ");
    }
    for record in &meta.imports {
        if !record.theme {
            continue;
        }
        let ImportTarget::Stylesheet(path) = &record.target else {
            continue;
        };
        let Ok(key) = FileKey::new(path) else { continue };
        if let Some(target) = files.meta_for(&key) {
            parts.push(root_export(&target, files, visited));
        }
    }
    parts.join(" ")
}

/// Own scoped name, then the extends target's export, then each compose
/// target's export.
fn class_export(
    meta: &Arc<Meta>,
    name: &SmolStr,
    resolver: &Resolver<'_>,
    visited: &mut FxHashSet<(FileKey, SmolStr)>,
    diagnostics: &mut DiagnosticCollector,
) -> Option<String> {
    let class = meta.class(name)?.clone();
    if !visited.insert((meta.source.clone(), name.clone())) {
        return Some(meta.scoped_name(name));
    }

    // an aliasing class renders as its target in the output, so its export
    // must name the target's scope, not the local one
    if class.extends.is_none() {
        if let Some(alias) = &class.alias {
            let mut resolver_diags = DiagnosticCollector::new();
            let resolved = resolver.deep_resolve(meta, alias, &mut resolver_diags);
            for diag in resolver_diags.take() {
                diagnostics.add(diag);
            }
            if let Some(Resolution::Css(resolve)) = resolved {
                match &resolve.symbol {
                    StSymbol::Class(target) if !target.is_root => {
                        let target_name = target.name.clone();
                        return class_export(
                            &resolve.meta,
                            &target_name,
                            resolver,
                            visited,
                            diagnostics,
                        );
                    }
                    StSymbol::Class(_) => return Some(resolve.meta.scoped_root()),
                    StSymbol::Element(element) => return Some(element.name.to_string()),
                    _ => {}
                }
            }
        }
    }

    let mut parts = vec![meta.scoped_name(name)];

    // extends before compose
    let mut targets = Vec::new();
    if let Some(parent) = &class.extends {
        targets.push(parent.clone());
    }
    targets.extend(class.compose.iter().cloned());

    for target in targets {
        let resolved = resolver.resolve_name(meta, &target, diagnostics);
        match resolved {
            Some(resolve) => match &resolve.symbol {
                StSymbol::Class(target_class) if !target_class.is_root => {
                    let target_name = target_class.name.clone();
                    if let Some(value) =
                        class_export(&resolve.meta, &target_name, resolver, visited, diagnostics)
                    {
                        parts.push(value);
                    }
                }
                StSymbol::Class(_) => parts.push(resolve.meta.scoped_root()),
                _ => {}
            },
            None => diagnostics.add(
                Diagnostic::warning(format!("could not resolve export target '{target}'"))
                    .with_code(codes::UNRESOLVED_REFERENCE),
            ),
        }
    }
    Some(parts.join(" "))
}
