//! Environment records
//!
//! Environments live in an arena owned by the realm and are addressed by [`EnvId`],
//! the same way objects are addressed by `ObjectId`. A record is a binding map plus
//! an `outer` link; the [`EnvironmentKind`] selects how the binding operations
//! behave (declarative, function, object/with, global, module).

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::error::{JsError, JsResult};
use crate::module::{BindingName, ModuleRecord, ResolvedExport, get_module_namespace};
use crate::object;
use crate::operations::{define_property_or_throw, get, has_own_property, set};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::reference::{Reference, ReferenceBase};
use crate::value::{JsString, JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// Handle to an environment record in the realm's environment arena
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(pub(crate) u32);

impl EnvId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env#{}", self.0)
    }
}

/// A declarative binding
#[derive(Debug, Clone)]
pub struct Binding {
    /// `None` until initialized (temporal dead zone)
    pub value: Option<JsValue>,
    pub mutable: bool,
    /// Immutable binding created strict: assignments always throw
    pub strict: bool,
    pub deletable: bool,
}

/// Binding slot: either a value or an indirect import binding
#[derive(Clone)]
enum Slot {
    Direct(Binding),
    Import {
        module: Rc<dyn ModuleRecord>,
        name: JsString,
    },
}

/// `[[ThisBindingStatus]]` of a function environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisBindingStatus {
    Lexical,
    Initialized,
    Uninitialized,
}

/// Extra state of a function environment
#[derive(Debug, Clone)]
pub struct FunctionEnvironment {
    pub this_value: JsValue,
    pub this_binding_status: ThisBindingStatus,
    pub function_object: ObjectId,
    pub new_target: Option<ObjectId>,
    /// `[[HomeObject]]` of the function, if it is a method
    pub home_object: Option<ObjectId>,
}

/// Extra state of the global environment
#[derive(Debug, Clone)]
pub struct GlobalEnvironment {
    /// Object record over the global object
    pub object_record: EnvId,
    pub global_object: ObjectId,
    pub global_this: ObjectId,
    /// `[[VarNames]]`
    pub var_names: FxHashSet<JsString>,
}

/// Kind of an environment record
#[derive(Debug, Clone)]
pub enum EnvironmentKind {
    Declarative,
    Function(FunctionEnvironment),
    Object {
        binding_object: ObjectId,
        is_with_environment: bool,
    },
    /// Declarative bindings are this record's own; var bindings go to `object_record`
    Global(GlobalEnvironment),
    Module,
}

/// An environment record
pub struct EnvironmentRecord {
    pub outer: Option<EnvId>,
    bindings: IndexMap<JsString, Slot, FxBuildHasher>,
    pub kind: EnvironmentKind,
}

impl EnvironmentRecord {
    fn new(outer: Option<EnvId>, kind: EnvironmentKind) -> Self {
        Self {
            outer,
            bindings: IndexMap::default(),
            kind,
        }
    }

    /// Names bound directly in this record, in creation order
    pub fn binding_names(&self) -> impl Iterator<Item = &JsString> {
        self.bindings.keys()
    }

    fn has_direct_binding(&self, name: &JsString) -> bool {
        self.bindings.contains_key(name)
    }
}

impl fmt::Debug for EnvironmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentRecord")
            .field("outer", &self.outer)
            .field("bindings", &self.bindings.len())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Arena owning every environment record of a realm
#[derive(Debug, Default)]
pub struct EnvironmentArena {
    records: Vec<EnvironmentRecord>,
}

impl EnvironmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, record: EnvironmentRecord) -> EnvId {
        let id = EnvId(self.records.len() as u32);
        self.records.push(record);
        id
    }

    pub fn get(&self, id: EnvId) -> JsResult<&EnvironmentRecord> {
        self.records
            .get(id.index())
            .ok_or_else(|| JsError::internal(format!("dangling environment handle {:?}", id)))
    }

    fn get_mut(&mut self, id: EnvId) -> JsResult<&mut EnvironmentRecord> {
        self.records
            .get_mut(id.index())
            .ok_or_else(|| JsError::internal(format!("dangling environment handle {:?}", id)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.records.shrink_to_fit();
    }
}

// =============================================================================
// Construction
// =============================================================================

/// `NewDeclarativeEnvironment(E)`
pub fn new_declarative_environment(realm: &mut Realm, outer: Option<EnvId>) -> EnvId {
    realm
        .envs
        .alloc(EnvironmentRecord::new(outer, EnvironmentKind::Declarative))
}

/// `NewObjectEnvironment(O, W, E)`
pub fn new_object_environment(
    realm: &mut Realm,
    binding_object: ObjectId,
    is_with_environment: bool,
    outer: Option<EnvId>,
) -> EnvId {
    realm.envs.alloc(EnvironmentRecord::new(
        outer,
        EnvironmentKind::Object {
            binding_object,
            is_with_environment,
        },
    ))
}

/// `NewFunctionEnvironment(F, newTarget)`
///
/// `outer` is the function's `[[Environment]]`; arrow functions pass `lexical_this`.
pub fn new_function_environment(
    realm: &mut Realm,
    function_object: ObjectId,
    new_target: Option<ObjectId>,
    outer: Option<EnvId>,
    lexical_this: bool,
    home_object: Option<ObjectId>,
) -> EnvId {
    let this_binding_status = if lexical_this {
        ThisBindingStatus::Lexical
    } else {
        ThisBindingStatus::Uninitialized
    };
    realm.envs.alloc(EnvironmentRecord::new(
        outer,
        EnvironmentKind::Function(FunctionEnvironment {
            this_value: JsValue::Undefined,
            this_binding_status,
            function_object,
            new_target,
            home_object,
        }),
    ))
}

/// `NewGlobalEnvironment(G, thisValue)`
pub fn new_global_environment(
    realm: &mut Realm,
    global_object: ObjectId,
    global_this: ObjectId,
) -> EnvId {
    let object_record = new_object_environment(realm, global_object, false, None);
    realm.envs.alloc(EnvironmentRecord::new(
        None,
        EnvironmentKind::Global(GlobalEnvironment {
            object_record,
            global_object,
            global_this,
            var_names: FxHashSet::default(),
        }),
    ))
}

/// `NewModuleEnvironment(E)`
pub fn new_module_environment(realm: &mut Realm, outer: Option<EnvId>) -> EnvId {
    realm
        .envs
        .alloc(EnvironmentRecord::new(outer, EnvironmentKind::Module))
}

// =============================================================================
// Declarative helpers
// =============================================================================

fn declarative_slot(realm: &Realm, env: EnvId, name: &JsString) -> JsResult<Option<Slot>> {
    Ok(realm.envs.get(env)?.bindings.get(name).cloned())
}

fn insert_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    binding: Binding,
) -> JsResult<()> {
    realm
        .envs
        .get_mut(env)?
        .bindings
        .insert(name.clone(), Slot::Direct(binding));
    Ok(())
}

fn tdz_error(name: &JsString) -> JsError {
    JsError::reference_error(format!("Cannot access '{}' before initialization", name))
}

fn object_record_of(kind: &EnvironmentKind) -> Option<EnvId> {
    match kind {
        EnvironmentKind::Global(global) => Some(global.object_record),
        _ => None,
    }
}

fn name_key(name: &JsString) -> PropertyKey {
    PropertyKey::from(name.clone())
}

// =============================================================================
// Binding operations (dispatch on the record kind)
// =============================================================================

/// `HasBinding(N)`
pub fn has_binding(realm: &mut Realm, env: EnvId, name: &JsString) -> JsResult<bool> {
    let record = realm.envs.get(env)?;
    match record.kind.clone() {
        EnvironmentKind::Declarative | EnvironmentKind::Function(_) | EnvironmentKind::Module => {
            Ok(record.has_direct_binding(name))
        }
        EnvironmentKind::Object {
            binding_object,
            is_with_environment,
        } => {
            let key = name_key(name);
            if !object::has_property(realm, binding_object, &key)? {
                return Ok(false);
            }
            if !is_with_environment {
                return Ok(true);
            }
            let unscopables = get(realm, binding_object, &WellKnownSymbol::Unscopables.key())?;
            if let JsValue::Object(unscopables) = unscopables {
                if get(realm, unscopables, &key)?.to_boolean() {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        EnvironmentKind::Global(global) => {
            if record.has_direct_binding(name) {
                return Ok(true);
            }
            has_binding(realm, global.object_record, name)
        }
    }
}

/// `CreateMutableBinding(N, D)`
pub fn create_mutable_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    deletable: bool,
) -> JsResult<()> {
    let record = realm.envs.get(env)?;
    match &record.kind {
        EnvironmentKind::Object { binding_object, .. } => {
            let binding_object = *binding_object;
            define_property_or_throw(
                realm,
                binding_object,
                &name_key(name),
                PropertyDescriptor::data(JsValue::Undefined, true, true, deletable),
            )
        }
        EnvironmentKind::Global(_) if record.has_direct_binding(name) => {
            Err(JsError::type_error(format!("Identifier '{}' has already been declared", name)))
        }
        _ => insert_binding(
            realm,
            env,
            name,
            Binding {
                value: None,
                mutable: true,
                strict: false,
                deletable,
            },
        ),
    }
}

/// `CreateImmutableBinding(N, S)`
pub fn create_immutable_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    strict: bool,
) -> JsResult<()> {
    let record = realm.envs.get(env)?;
    match &record.kind {
        EnvironmentKind::Object { .. } => {
            Err(JsError::internal("object environment records have no immutable bindings"))
        }
        EnvironmentKind::Global(_) if record.has_direct_binding(name) => {
            Err(JsError::type_error(format!("Identifier '{}' has already been declared", name)))
        }
        _ => insert_binding(
            realm,
            env,
            name,
            Binding {
                value: None,
                mutable: false,
                strict,
                deletable: false,
            },
        ),
    }
}

/// `InitializeBinding(N, V)`
pub fn initialize_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    value: JsValue,
) -> JsResult<()> {
    let record = realm.envs.get(env)?;
    match record.kind.clone() {
        EnvironmentKind::Object { .. } => set_mutable_binding(realm, env, name, value, false),
        EnvironmentKind::Global(global) if !record.has_direct_binding(name) => {
            initialize_binding(realm, global.object_record, name, value)
        }
        _ => match realm.envs.get_mut(env)?.bindings.get_mut(name) {
            Some(Slot::Direct(binding)) => {
                binding.value = Some(value);
                Ok(())
            }
            Some(Slot::Import { .. }) => {
                Err(JsError::internal(format!("cannot initialize import binding '{}'", name)))
            }
            None => Err(JsError::internal(format!("initializing missing binding '{}'", name))),
        },
    }
}

/// `SetMutableBinding(N, V, S)`
pub fn set_mutable_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    value: JsValue,
    strict: bool,
) -> JsResult<()> {
    let record = realm.envs.get(env)?;
    match record.kind.clone() {
        EnvironmentKind::Object { binding_object, .. } => {
            let key = name_key(name);
            let still_exists = object::has_property(realm, binding_object, &key)?;
            if !still_exists && strict {
                return Err(JsError::not_defined(name));
            }
            set(realm, binding_object, &key, value, strict)
        }
        EnvironmentKind::Global(global) if !record.has_direct_binding(name) => {
            set_mutable_binding(realm, global.object_record, name, value, strict)
        }
        _ => {
            let slot = declarative_slot(realm, env, name)?;
            match slot {
                None => {
                    if strict {
                        return Err(JsError::not_defined(name));
                    }
                    create_mutable_binding(realm, env, name, true)?;
                    initialize_binding(realm, env, name, value)
                }
                Some(Slot::Import { .. }) => {
                    Err(JsError::type_error(format!("Assignment to constant variable '{}'", name)))
                }
                Some(Slot::Direct(binding)) => {
                    let strict = strict || binding.strict;
                    if binding.value.is_none() {
                        return Err(tdz_error(name));
                    }
                    if binding.mutable {
                        if let Some(Slot::Direct(binding)) =
                            realm.envs.get_mut(env)?.bindings.get_mut(name)
                        {
                            binding.value = Some(value);
                        }
                        return Ok(());
                    }
                    if strict {
                        return Err(JsError::type_error(format!(
                            "Assignment to constant variable '{}'",
                            name
                        )));
                    }
                    Ok(())
                }
            }
        }
    }
}

/// `GetBindingValue(N, S)`
pub fn get_binding_value(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    strict: bool,
) -> JsResult<JsValue> {
    let record = realm.envs.get(env)?;
    match record.kind.clone() {
        EnvironmentKind::Object { binding_object, .. } => {
            let key = name_key(name);
            if !object::has_property(realm, binding_object, &key)? {
                if strict {
                    return Err(JsError::not_defined(name));
                }
                return Ok(JsValue::Undefined);
            }
            get(realm, binding_object, &key)
        }
        EnvironmentKind::Global(global) if !record.has_direct_binding(name) => {
            get_binding_value(realm, global.object_record, name, strict)
        }
        _ => match declarative_slot(realm, env, name)? {
            Some(Slot::Direct(binding)) => binding.value.ok_or_else(|| tdz_error(name)),
            Some(Slot::Import { module, name }) => get_import_value(realm, &module, &name),
            None => Err(JsError::not_defined(name)),
        },
    }
}

/// Read through an indirect import binding at access time
fn get_import_value(
    realm: &mut Realm,
    module: &Rc<dyn ModuleRecord>,
    name: &JsString,
) -> JsResult<JsValue> {
    let ResolvedExport::Binding(binding) = module.resolve_export(name, &mut Vec::new()) else {
        return Err(JsError::syntax_error(format!(
            "The requested module does not provide an export named '{}'",
            name
        )));
    };
    let binding_name = match binding.binding_name {
        BindingName::Namespace => {
            return get_module_namespace(realm, &binding.module).map(JsValue::Object);
        }
        BindingName::Name(binding_name) => binding_name,
    };
    let Some(target_env) = binding.module.environment() else {
        return Err(JsError::reference_error(format!(
            "Cannot access '{}': module environment is gone",
            binding_name
        )));
    };
    get_binding_value(realm, target_env, &binding_name, true)
}

/// `DeleteBinding(N)`
pub fn delete_binding(realm: &mut Realm, env: EnvId, name: &JsString) -> JsResult<bool> {
    let record = realm.envs.get(env)?;
    match record.kind.clone() {
        EnvironmentKind::Object { binding_object, .. } => {
            object::delete(realm, binding_object, &name_key(name))
        }
        EnvironmentKind::Global(global) if !record.has_direct_binding(name) => {
            let key = name_key(name);
            if has_own_property(realm, global.global_object, &key)? {
                let status = delete_binding(realm, global.object_record, name)?;
                if status {
                    if let EnvironmentKind::Global(global) = &mut realm.envs.get_mut(env)?.kind {
                        global.var_names.remove(name);
                    }
                }
                return Ok(status);
            }
            Ok(true)
        }
        EnvironmentKind::Module => Ok(false),
        _ => match declarative_slot(realm, env, name)? {
            Some(Slot::Direct(binding)) if !binding.deletable => Ok(false),
            Some(_) => {
                realm.envs.get_mut(env)?.bindings.shift_remove(name);
                Ok(true)
            }
            None => Ok(true),
        },
    }
}

/// `HasThisBinding()`
pub fn has_this_binding(realm: &Realm, env: EnvId) -> JsResult<bool> {
    Ok(match &realm.envs.get(env)?.kind {
        EnvironmentKind::Function(f) => f.this_binding_status != ThisBindingStatus::Lexical,
        EnvironmentKind::Global(_) | EnvironmentKind::Module => true,
        EnvironmentKind::Declarative | EnvironmentKind::Object { .. } => false,
    })
}

/// `HasSuperBinding()`
pub fn has_super_binding(realm: &Realm, env: EnvId) -> JsResult<bool> {
    Ok(match &realm.envs.get(env)?.kind {
        EnvironmentKind::Function(f) => {
            f.this_binding_status != ThisBindingStatus::Lexical && f.home_object.is_some()
        }
        _ => false,
    })
}

/// `WithBaseObject()`
pub fn with_base_object(realm: &Realm, env: EnvId) -> JsResult<Option<ObjectId>> {
    Ok(match &realm.envs.get(env)?.kind {
        EnvironmentKind::Object {
            binding_object,
            is_with_environment: true,
        } => Some(*binding_object),
        _ => None,
    })
}

/// `BindThisValue(V)`
pub fn bind_this_value(realm: &mut Realm, env: EnvId, value: JsValue) -> JsResult<JsValue> {
    let EnvironmentKind::Function(f) = &mut realm.envs.get_mut(env)?.kind else {
        return Err(JsError::internal("BindThisValue on a non-function environment"));
    };
    match f.this_binding_status {
        ThisBindingStatus::Lexical => Err(JsError::internal("BindThisValue on an arrow function")),
        ThisBindingStatus::Initialized => {
            Err(JsError::reference_error("Super constructor may only be called once"))
        }
        ThisBindingStatus::Uninitialized => {
            f.this_value = value.clone();
            f.this_binding_status = ThisBindingStatus::Initialized;
            Ok(value)
        }
    }
}

/// `GetThisBinding()`
pub fn get_this_binding(realm: &Realm, env: EnvId) -> JsResult<JsValue> {
    match &realm.envs.get(env)?.kind {
        EnvironmentKind::Function(f) => match f.this_binding_status {
            ThisBindingStatus::Lexical => {
                Err(JsError::internal("GetThisBinding on an arrow function"))
            }
            ThisBindingStatus::Uninitialized => Err(JsError::reference_error(
                "Must call super constructor in derived class before accessing 'this'",
            )),
            ThisBindingStatus::Initialized => Ok(f.this_value.clone()),
        },
        EnvironmentKind::Global(global) => Ok(JsValue::Object(global.global_this)),
        EnvironmentKind::Module => Ok(JsValue::Undefined),
        _ => Err(JsError::internal("GetThisBinding on an environment without this")),
    }
}

/// `GetSuperBase()`
pub fn get_super_base(realm: &mut Realm, env: EnvId) -> JsResult<JsValue> {
    let home = match &realm.envs.get(env)?.kind {
        EnvironmentKind::Function(f) => f.home_object,
        _ => None,
    };
    let Some(home) = home else {
        return Ok(JsValue::Undefined);
    };
    Ok(object::get_prototype_of(realm, home)?.map_or(JsValue::Null, JsValue::Object))
}

// =============================================================================
// Global environment
// =============================================================================

fn global_record(realm: &Realm, env: EnvId) -> JsResult<GlobalEnvironment> {
    match &realm.envs.get(env)?.kind {
        EnvironmentKind::Global(global) => Ok(global.clone()),
        _ => Err(JsError::internal("expected the global environment")),
    }
}

/// `HasVarDeclaration(N)`
pub fn has_var_declaration(realm: &Realm, env: EnvId, name: &JsString) -> JsResult<bool> {
    match &realm.envs.get(env)?.kind {
        EnvironmentKind::Global(global) => Ok(global.var_names.contains(name)),
        _ => Err(JsError::internal("expected the global environment")),
    }
}

/// `HasLexicalDeclaration(N)`
pub fn has_lexical_declaration(realm: &Realm, env: EnvId, name: &JsString) -> JsResult<bool> {
    let record = realm.envs.get(env)?;
    if object_record_of(&record.kind).is_none() {
        return Err(JsError::internal("expected the global environment"));
    }
    Ok(record.has_direct_binding(name))
}

/// `HasRestrictedGlobalProperty(N)`
pub fn has_restricted_global_property(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
) -> JsResult<bool> {
    let global = global_record(realm, env)?;
    match object::get_own_property(realm, global.global_object, &name_key(name))? {
        Some(desc) => Ok(!desc.is_configurable()),
        None => Ok(false),
    }
}

/// `CanDeclareGlobalVar(N)`
pub fn can_declare_global_var(realm: &mut Realm, env: EnvId, name: &JsString) -> JsResult<bool> {
    let global = global_record(realm, env)?;
    if has_own_property(realm, global.global_object, &name_key(name))? {
        return Ok(true);
    }
    object::is_extensible(realm, global.global_object)
}

/// `CanDeclareGlobalFunction(N)`
pub fn can_declare_global_function(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
) -> JsResult<bool> {
    let global = global_record(realm, env)?;
    let Some(existing) =
        object::get_own_property(realm, global.global_object, &name_key(name))?
    else {
        return object::is_extensible(realm, global.global_object);
    };
    if existing.is_configurable() {
        return Ok(true);
    }
    Ok(existing.is_data_descriptor() && existing.is_writable() && existing.is_enumerable())
}

/// `CreateGlobalVarBinding(N, D)`
pub fn create_global_var_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    deletable: bool,
) -> JsResult<()> {
    let global = global_record(realm, env)?;
    let has_property = has_own_property(realm, global.global_object, &name_key(name))?;
    let extensible = object::is_extensible(realm, global.global_object)?;
    if !has_property && extensible {
        create_mutable_binding(realm, global.object_record, name, deletable)?;
        initialize_binding(realm, global.object_record, name, JsValue::Undefined)?;
    }
    if let EnvironmentKind::Global(global) = &mut realm.envs.get_mut(env)?.kind {
        global.var_names.insert(name.clone());
    }
    Ok(())
}

/// `CreateGlobalFunctionBinding(N, V, D)`
pub fn create_global_function_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    value: JsValue,
    deletable: bool,
) -> JsResult<()> {
    let global = global_record(realm, env)?;
    let key = name_key(name);
    let existing = object::get_own_property(realm, global.global_object, &key)?;
    let desc = match existing {
        Some(existing) if !existing.is_configurable() => {
            PropertyDescriptor::default().with_value(value.clone())
        }
        _ => PropertyDescriptor::data(value.clone(), true, true, deletable),
    };
    define_property_or_throw(realm, global.global_object, &key, desc)?;
    set(realm, global.global_object, &key, value, false)?;
    if let EnvironmentKind::Global(global) = &mut realm.envs.get_mut(env)?.kind {
        global.var_names.insert(name.clone());
    }
    Ok(())
}

// =============================================================================
// Module environment
// =============================================================================

/// `CreateImportBinding(N, M, N2)`: an immutable, indirect binding to `M`'s export
pub fn create_import_binding(
    realm: &mut Realm,
    env: EnvId,
    name: &JsString,
    module: Rc<dyn ModuleRecord>,
    export_name: &JsString,
) -> JsResult<()> {
    let record = realm.envs.get_mut(env)?;
    if !matches!(record.kind, EnvironmentKind::Module) {
        return Err(JsError::internal("import binding outside a module environment"));
    }
    record.bindings.insert(
        name.clone(),
        Slot::Import {
            module,
            name: export_name.clone(),
        },
    );
    Ok(())
}

// =============================================================================
// Resolution
// =============================================================================

/// `GetIdentifierReference(env, name, strict)`
pub fn get_identifier_reference(
    realm: &mut Realm,
    env: Option<EnvId>,
    name: &JsString,
    strict: bool,
) -> JsResult<Reference> {
    let mut current = env;
    while let Some(env) = current {
        if has_binding(realm, env, name)? {
            return Ok(Reference {
                base: ReferenceBase::Environment(env),
                name: PropertyKey::String(name.clone()),
                strict,
                this_value: None,
            });
        }
        current = realm.envs.get(env)?.outer;
    }
    Ok(Reference {
        base: ReferenceBase::Unresolvable,
        name: PropertyKey::String(name.clone()),
        strict,
        this_value: None,
    })
}

/// `ResolveBinding(name, env)`; `env` defaults to the running context's lexical environment
pub fn resolve_binding(
    realm: &mut Realm,
    name: &JsString,
    env: Option<EnvId>,
    strict: bool,
) -> JsResult<Reference> {
    let env = match env {
        Some(env) => Some(env),
        None => realm.running_context()?.lexical_environment,
    };
    get_identifier_reference(realm, env, name, strict)
}

/// `GetThisEnvironment()`
pub fn get_this_environment(realm: &Realm) -> JsResult<EnvId> {
    let mut current = realm.running_context()?.lexical_environment;
    while let Some(env) = current {
        if has_this_binding(realm, env)? {
            return Ok(env);
        }
        current = realm.envs.get(env)?.outer;
    }
    Err(JsError::internal("no environment with a this binding"))
}

/// `ResolveThisBinding()`
pub fn resolve_this_binding(realm: &Realm) -> JsResult<JsValue> {
    let env = get_this_environment(realm)?;
    get_this_binding(realm, env)
}

/// `GetNewTarget()`
pub fn get_new_target(realm: &Realm) -> JsResult<JsValue> {
    let env = get_this_environment(realm)?;
    Ok(match &realm.envs.get(env)?.kind {
        EnvironmentKind::Function(f) => f.new_target.map_or(JsValue::Undefined, JsValue::Object),
        _ => JsValue::Undefined,
    })
}

/// `GetGlobalObject()`
pub fn get_global_object(realm: &Realm) -> ObjectId {
    realm.global_object()
}
