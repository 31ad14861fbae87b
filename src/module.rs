//! Module records and namespaces
//!
//! Loading, linking and evaluating source modules belong to the embedding driver.
//! The engine only needs what namespaces and import bindings observe: the exported
//! names, export resolution, and the module's environment. [`SyntheticModule`] is a
//! host-defined module whose exports are set directly from Rust.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::environment::{
    EnvId, create_mutable_binding, initialize_binding, new_module_environment, set_mutable_binding,
};
use crate::error::{JsError, JsResult};
use crate::object::namespace::module_namespace_create;
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId};

/// Realm-unique module identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

/// Name a resolved export is bound to in its module
#[derive(Debug, Clone, PartialEq)]
pub enum BindingName {
    Name(JsString),
    /// `export * as ns from "m"`: the export is the namespace of `module`
    Namespace,
}

/// ResolvedBinding Record
#[derive(Clone)]
pub struct ResolvedBinding {
    pub module: Rc<dyn ModuleRecord>,
    pub binding_name: BindingName,
}

impl fmt::Debug for ResolvedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedBinding")
            .field("module", &self.module.id())
            .field("binding_name", &self.binding_name)
            .finish()
    }
}

/// Result of `ResolveExport`
#[derive(Debug, Clone)]
pub enum ResolvedExport {
    Binding(ResolvedBinding),
    /// Not found, or a circular import chain
    Null,
    /// Several `export *` paths provide different bindings
    Ambiguous,
}

impl ResolvedExport {
    pub fn is_binding(&self) -> bool {
        matches!(self, ResolvedExport::Binding(_))
    }
}

/// Abstract Module Record
pub trait ModuleRecord {
    fn id(&self) -> ModuleId;

    /// `[[Environment]]`; `None` before linking or after the module was torn down
    fn environment(&self) -> Option<EnvId>;

    /// `GetExportedNames(exportStarSet)`
    fn get_exported_names(&self, export_star_set: &mut Vec<ModuleId>) -> Vec<JsString>;

    /// `ResolveExport(exportName, resolveSet)`
    fn resolve_export(
        &self,
        export_name: &JsString,
        resolve_set: &mut Vec<(ModuleId, JsString)>,
    ) -> ResolvedExport;
}

/// `GetModuleNamespace(module)`
///
/// Namespaces are created lazily and cached per module, so every import of the
/// same module observes the same object.
pub fn get_module_namespace(
    realm: &mut Realm,
    module: &Rc<dyn ModuleRecord>,
) -> JsResult<ObjectId> {
    if let Some(namespace) = realm.cached_namespace(module.id()) {
        return Ok(namespace);
    }
    let exported = module.get_exported_names(&mut Vec::new());
    let unambiguous: Vec<JsString> = exported
        .into_iter()
        .filter(|name| module.resolve_export(name, &mut Vec::new()).is_binding())
        .collect();
    let namespace = module_namespace_create(realm, module.clone(), unambiguous)?;
    realm.cache_namespace(module.id(), namespace);
    Ok(namespace)
}

/// Host-defined module with a fixed list of exports
///
/// Each export is a mutable binding in the module's own environment, initialized
/// to `undefined`; the host updates it with [`SyntheticModule::set_export`] and
/// namespaces see the change on their next read.
pub struct SyntheticModule {
    id: ModuleId,
    export_names: Vec<JsString>,
    environment: Cell<Option<EnvId>>,
    this: Weak<SyntheticModule>,
}

impl SyntheticModule {
    /// Create the module and its environment (outer: the realm's global environment)
    pub fn create(realm: &mut Realm, export_names: &[&str]) -> JsResult<Rc<SyntheticModule>> {
        let id = realm.next_module_id();
        let global = realm.global_env();
        let env = new_module_environment(realm, Some(global));
        let export_names: Vec<JsString> = export_names.iter().map(|n| JsString::from(*n)).collect();
        for name in &export_names {
            create_mutable_binding(realm, env, name, false)?;
            initialize_binding(realm, env, name, JsValue::Undefined)?;
        }
        Ok(Rc::new_cyclic(|this| SyntheticModule {
            id,
            export_names,
            environment: Cell::new(Some(env)),
            this: this.clone(),
        }))
    }

    /// `SetSyntheticModuleExport`
    pub fn set_export(&self, realm: &mut Realm, name: &str, value: JsValue) -> JsResult<()> {
        let name = JsString::from(name);
        if !self.export_names.contains(&name) {
            return Err(JsError::reference_error(format!(
                "module does not export '{}'",
                name
            )));
        }
        let Some(env) = self.environment.get() else {
            return Err(JsError::reference_error(format!(
                "Cannot assign '{}': module environment is gone",
                name
            )));
        };
        set_mutable_binding(realm, env, &name, value, true)
    }

    /// Drop the link to the environment; later namespace reads raise ReferenceError
    pub fn detach_environment(&self) {
        self.environment.set(None);
    }

    /// This module as a trait object, for namespace creation
    pub fn as_record(self: &Rc<Self>) -> Rc<dyn ModuleRecord> {
        self.clone()
    }
}

impl ModuleRecord for SyntheticModule {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn environment(&self) -> Option<EnvId> {
        self.environment.get()
    }

    fn get_exported_names(&self, _export_star_set: &mut Vec<ModuleId>) -> Vec<JsString> {
        self.export_names.clone()
    }

    fn resolve_export(
        &self,
        export_name: &JsString,
        _resolve_set: &mut Vec<(ModuleId, JsString)>,
    ) -> ResolvedExport {
        if !self.export_names.contains(export_name) {
            return ResolvedExport::Null;
        }
        match self.this.upgrade() {
            Some(module) => ResolvedExport::Binding(ResolvedBinding {
                module,
                binding_name: BindingName::Name(export_name.clone()),
            }),
            None => ResolvedExport::Null,
        }
    }
}
