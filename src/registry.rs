//! The module registry (§3, §4.9): the transitive closure of modules
//! reachable from a root module, each module's functions, and the
//! one-time, in-module-order evaluation of every module's globals.
//!
//! File-based module loading and the concrete-syntax parser are external
//! collaborators (§1); modules are loaded from a serialized AST
//! (`.rail.json`; see [`Module`]'s `serde` derive), not Railway source
//! text.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::ast::{split_qualified, Module};
use crate::error::{RailwayError, RailwayResult};
use crate::eval_expr::{self, NameResolver};
use crate::scope::Scope;
use crate::value::Value;

#[derive(Debug)]
pub struct ModuleRegistry {
    modules: HashMap<String, Module>,
    globals: HashMap<String, Scope>,
}

impl ModuleRegistry {
    /// Load the root module and the transitive closure of its imports
    /// from `.rail.json` files next to it, then evaluate every module's
    /// globals once, in import-then-self order.
    pub fn load_root(path: &Path) -> RailwayResult<(Self, String)> {
        let mut modules = HashMap::new();
        let root = load_module_file(path)?;
        let root_name = root.name.clone();
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut pending = vec![root];
        while let Some(module) = pending.pop() {
            if modules.contains_key(&module.name) {
                continue;
            }
            for (_, imported_name) in &module.imports {
                if !modules.contains_key(imported_name) {
                    let import_path = base_dir.join(format!("{imported_name}.rail.json"));
                    pending.push(load_module_file(&import_path)?);
                }
            }
            modules.insert(module.name.clone(), module);
        }
        let globals = evaluate_all_globals(&modules, &root_name)?;
        Ok((ModuleRegistry { modules, globals }, root_name))
    }

    /// Build a registry directly from in-memory modules (used by tests and
    /// embedders that construct the AST themselves rather than going
    /// through `.rail.json`).
    pub fn from_modules(modules: Vec<Module>, root_name: &str) -> RailwayResult<Self> {
        let map: HashMap<String, Module> = modules.into_iter().map(|m| (m.name.clone(), m)).collect();
        let globals = evaluate_all_globals(&map, root_name)?;
        Ok(ModuleRegistry { modules: map, globals })
    }

    pub fn module(&self, name: &str) -> RailwayResult<&Module> {
        self.modules.get(name).ok_or_else(|| RailwayError::load_error(format!("unknown module '{name}'")))
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn function<'a>(&'a self, module: &str, name: &str) -> RailwayResult<&'a crate::ast::Function> {
        self.module(module)?
            .function(name)
            .ok_or_else(|| RailwayError::load_error(format!("unknown function '{name}' in module '{module}'")))
    }

    /// Resolve a (possibly module-qualified) global name read from within
    /// `current_module`.
    pub fn resolve_global(&self, current_module: &str, name: &str) -> RailwayResult<Value> {
        if let Some((alias, rest)) = split_qualified(name) {
            let target = self
                .module(current_module)?
                .imports
                .iter()
                .find(|(a, _)| a == alias)
                .map(|(_, m)| m.clone())
                .ok_or_else(|| RailwayError::scope_error(format!("no import aliased '{alias}' in module '{current_module}'")))?;
            self.global(&target, rest)
        } else {
            self.global(current_module, name)
        }
    }

    fn global(&self, module: &str, name: &str) -> RailwayResult<Value> {
        self.globals
            .get(module)
            .and_then(|s| s.get(name).ok())
            .ok_or_else(|| RailwayError::scope_error(format!("undefined global '{name}' in module '{module}'")))
    }
}

fn load_module_file(path: &Path) -> RailwayResult<Module> {
    let text = fs::read_to_string(path)
        .map_err(|e| RailwayError::load_error(format!("reading '{}': {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| RailwayError::load_error(format!("parsing '{}': {e}", path.display())))
}

/// Evaluates each module's globals, in declaration order, visiting a
/// module's imports before the module itself (so `<module>.<name>` reads
/// always see an already-computed value).
fn evaluate_all_globals(modules: &HashMap<String, Module>, root: &str) -> RailwayResult<HashMap<String, Scope>> {
    let mut done = HashMap::new();
    let mut visiting = HashSet::new();
    evaluate_module_globals(root, modules, &mut done, &mut visiting)?;
    Ok(done)
}

fn evaluate_module_globals(
    name: &str,
    modules: &HashMap<String, Module>,
    done: &mut HashMap<String, Scope>,
    visiting: &mut HashSet<String>,
) -> RailwayResult<()> {
    if done.contains_key(name) {
        return Ok(());
    }
    if !visiting.insert(name.to_string()) {
        return Err(RailwayError::load_error(format!("cyclic module imports involving '{name}'")));
    }
    let module = modules
        .get(name)
        .ok_or_else(|| RailwayError::load_error(format!("unknown module '{name}'")))?;
    for (_, imported) in &module.imports {
        evaluate_module_globals(imported, modules, done, visiting)?;
    }
    let mut scope = Scope::new();
    for (global_name, expr) in &module.globals {
        let resolver = BootstrapResolver { modules, done, current: name };
        let value = eval_expr::eval(expr, &scope, &resolver)?;
        scope.let_(global_name, value)?;
    }
    visiting.remove(name);
    done.insert(name.to_string(), scope);
    Ok(())
}

/// A [`NameResolver`] used only while a module's own globals are still
/// being computed: other modules' globals are fully done by this point
/// (import order is evaluated depth-first), but this module's own globals
/// live in the `scope` passed to `eval` alongside this resolver.
struct BootstrapResolver<'a> {
    modules: &'a HashMap<String, Module>,
    done: &'a HashMap<String, Scope>,
    current: &'a str,
}

impl NameResolver for BootstrapResolver<'_> {
    fn resolve_global(&self, name: &str) -> RailwayResult<Value> {
        if let Some((alias, rest)) = split_qualified(name) {
            let target = self
                .modules
                .get(self.current)
                .ok_or_else(|| RailwayError::load_error(format!("unknown module '{}'", self.current)))?
                .imports
                .iter()
                .find(|(a, _)| a == alias)
                .map(|(_, m)| m.clone())
                .ok_or_else(|| RailwayError::scope_error(format!("no import aliased '{alias}'")))?;
            self.done
                .get(&target)
                .and_then(|s| s.get(rest).ok())
                .ok_or_else(|| RailwayError::scope_error(format!("undefined global '{rest}' in module '{target}'")))
        } else {
            Err(RailwayError::scope_error(format!("undefined global '{name}' in module '{}'", self.current)))
        }
    }

    fn thread_id(&self) -> usize {
        0
    }

    fn num_threads(&self) -> usize {
        1
    }
}
