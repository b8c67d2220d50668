//! Process-wide registry of objects addressable by dotted path.
//!
//! Form types may name their form class, validation hook or any other
//! attribute as a string like `"testapp.forms.validate_contact_form"`.
//! Such strings are looked up here. The application registers every
//! referenced object once at startup.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A registered object.
pub type Symbol = Arc<dyn Any + Send + Sync>;

fn registry() -> &'static RwLock<HashMap<String, Symbol>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Symbol>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers `value` under `path`, replacing any previous registration.
///
/// # Examples
///
/// ```
/// use plugform_models::symbols::{import_symbol, register_symbol};
///
/// register_symbol("docs.answer", 42_u32);
/// let symbol = import_symbol("docs.answer").unwrap();
/// assert_eq!(symbol.downcast_ref::<u32>(), Some(&42));
/// ```
pub fn register_symbol<T: Any + Send + Sync>(path: impl Into<String>, value: T) {
    register_shared(path, Arc::new(value));
}

/// Registers an already shared object under `path`.
pub fn register_shared(path: impl Into<String>, symbol: Symbol) {
    let path = path.into();
    tracing::debug!(%path, "registered symbol");
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(path, symbol);
}

/// Removes the registration of `path`, returning it.
pub fn unregister_symbol(path: &str) -> Option<Symbol> {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(path)
}

/// Looks up the object registered under `path`.
pub fn import_symbol(path: &str) -> Option<Symbol> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(path)
        .cloned()
}
