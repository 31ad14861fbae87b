//! Embeddable ECMAScript execution engine
//!
//! `jsrealm` implements the runtime half of a JavaScript engine: realms with their
//! intrinsics and global object, the object model (ordinary, array, string, proxy and
//! module namespace objects), property descriptors, environment records, execution
//! contexts with a cooperative timeout, generators and promise jobs. It owns no
//! parser; a driver supplies function bodies through [`function::FunctionCode`] and
//! [`generator::GeneratorBody`], and optionally a [`host::DynamicEvaluator`] for
//! `eval` and `Function`.
//!
//! # Example
//!
//! ```
//! use jsrealm::operations::{create_data_property_or_throw, get};
//! use jsrealm::{HostConfig, JsValue, PropertyKey, Realm};
//!
//! let mut realm = Realm::create(HostConfig::default());
//! let global = realm.global_object();
//! let key = PropertyKey::from("answer");
//! create_data_property_or_throw(&mut realm, global, &key, JsValue::Number(42.0))?;
//! assert_eq!(get(&mut realm, global, &key)?, JsValue::Number(42.0));
//! # Ok::<(), jsrealm::JsError>(())
//! ```

pub mod builtins;
pub mod completion;
pub mod context;
pub mod environment;
pub mod error;
pub mod function;
pub mod generator;
pub mod heap;
pub mod host;
pub mod module;
pub mod object;
pub mod operations;
pub mod platform;
pub mod property;
pub mod realm;
pub mod reference;
pub mod value;

pub use completion::{Completion, CompletionType};
pub use error::{JsError, JsResult, NativeErrorKind};
pub use host::{DynamicEvaluator, DynamicFunctionKind, HostConfig, RealmConfig};
pub use property::PropertyDescriptor;
pub use realm::Realm;
pub use value::{CheapClone, JsString, JsSymbol, JsValue, ObjectId, PropertyKey, WellKnownSymbol};
