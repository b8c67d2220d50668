//! Form types: the selectable kinds of configured form.
//!
//! A [`FormType`] names its layout regions, the form class the assembled
//! form is built on, and a validation hook. Attributes are stored raw and
//! resolved once on first access: a string that looks like a dotted path
//! (`app.module.name`) is looked up in the [symbol registry](crate::symbols)
//! and replaced by the registered object. Strings that only look like paths
//! stay strings. Resolutions are memoized per attribute per instance.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use plugform_core::{PlugformError, PlugformResult, ValidationError};
use plugform_forms::{BaseForm, FormClass};
use regex::Regex;

use crate::configured_form::ConfiguredForm;
use crate::symbols::{import_symbol, Symbol};

static DOTTED_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+\.([\w.]+)+$").expect("valid regex"));

const REQUIRED: [&str; 3] = ["key", "label", "regions"];

/// Returns `true` if `value` has the shape of a dotted path.
pub fn is_dotted_path(value: &str) -> bool {
    DOTTED_PATH_RE.is_match(value)
}

/// A form-level validation hook. Returns the errors found in the cleaned
/// form; errors without per-field entries apply to the whole form.
pub type ValidateFn = Arc<dyn Fn(&BaseForm) -> Vec<ValidationError> + Send + Sync>;

/// Wraps a closure as a [`ValidateFn`].
pub fn validate_fn<F>(f: F) -> ValidateFn
where
    F: Fn(&BaseForm) -> Vec<ValidationError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The default validation hook: reports nothing.
pub fn no_validation() -> ValidateFn {
    validate_fn(|_| Vec::new())
}

/// A layout slot of a configured form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Stable identifier.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Whether content is inherited from ancestors.
    pub inherited: bool,
}

impl Region {
    /// Creates a non-inherited region.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            inherited: false,
        }
    }
}

/// Computes the regions of a configured form.
pub type RegionsFn = Arc<dyn Fn(&ConfiguredForm) -> Vec<Region> + Send + Sync>;

/// Where a form type's regions come from.
#[derive(Clone)]
pub enum RegionsSource {
    /// A fixed list.
    Static(Vec<Region>),
    /// A function of the configured form.
    Dynamic(RegionsFn),
}

impl RegionsSource {
    /// Returns the regions for `form`.
    pub fn regions_for(&self, form: &ConfiguredForm) -> Vec<Region> {
        match self {
            Self::Static(regions) => regions.clone(),
            Self::Dynamic(f) => f(form),
        }
    }
}

impl fmt::Debug for RegionsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(regions) => f.debug_tuple("Static").field(regions).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// The raw configuration of an attribute.
#[derive(Clone)]
pub enum AttrSource {
    /// A string, resolved through the symbol registry if it is a dotted
    /// path.
    Text(String),
    /// An object used as is.
    Object(Symbol),
}

impl AttrSource {
    /// Wraps an object.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::Object(Arc::new(value))
    }
}

impl From<&str> for AttrSource {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrSource {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A resolved attribute value.
#[derive(Clone)]
pub enum Resolved {
    /// A plain string, including dotted paths that did not resolve.
    Text(String),
    /// An object.
    Object(Symbol),
}

impl Resolved {
    /// Returns the string, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Object(_) => None,
        }
    }

    /// Returns the shared object, if this is one.
    pub const fn as_object(&self) -> Option<&Symbol> {
        match self {
            Self::Text(_) => None,
            Self::Object(object) => Some(object),
        }
    }

    /// Downcasts the object to `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(|o| o.downcast_ref::<T>())
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

struct Attribute {
    source: AttrSource,
    resolved: OnceLock<Resolved>,
}

impl Attribute {
    fn new(source: AttrSource) -> Self {
        Self {
            source,
            resolved: OnceLock::new(),
        }
    }

    fn get(&self, name: &str) -> &Resolved {
        self.resolved.get_or_init(|| match &self.source {
            AttrSource::Text(text) if is_dotted_path(text) => {
                if let Some(symbol) = import_symbol(text) {
                    tracing::debug!(attribute = name, path = %text, "resolved dotted path");
                    Resolved::Object(symbol)
                } else {
                    tracing::debug!(attribute = name, path = %text, "dotted path not registered, kept as text");
                    Resolved::Text(text.clone())
                }
            }
            AttrSource::Text(text) => Resolved::Text(text.clone()),
            AttrSource::Object(object) => Resolved::Object(Arc::clone(object)),
        })
    }
}

/// Describes one selectable kind of configured form.
///
/// # Examples
///
/// ```
/// use plugform_models::form_type::{FormType, Region};
///
/// let contact = FormType::builder()
///     .key("contact")
///     .label("contact form")
///     .regions(vec![Region::new("form", "form")])
///     .attr("process", "not.registered.anywhere")
///     .build()
///     .unwrap();
///
/// assert_eq!(contact.key(), "contact");
/// assert_eq!(contact.attr("process").unwrap().as_text(), Some("not.registered.anywhere"));
/// assert_eq!(contact.form_class().unwrap().name, "Form");
/// ```
pub struct FormType {
    key: String,
    label: String,
    attrs: BTreeMap<String, Attribute>,
}

impl FormType {
    /// Starts building a form type.
    pub fn builder() -> FormTypeBuilder {
        FormTypeBuilder::default()
    }

    /// The stable choice value.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the resolved value of an attribute, resolving it on first
    /// access.
    pub fn attr(&self, name: &str) -> Option<&Resolved> {
        self.attrs.get(name).map(|a| a.get(name))
    }

    /// Returns the resolved attribute downcast to `T`.
    pub fn attr_as<T: Any>(&self, name: &str) -> Option<&T> {
        self.attr(name).and_then(Resolved::downcast_ref)
    }

    /// Returns `true` if the attribute has been resolved already.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.attrs.get(name).is_some_and(|a| a.resolved.get().is_some())
    }

    /// Returns the attribute names.
    pub fn attr_names(&self) -> Vec<&str> {
        self.attrs.keys().map(String::as_str).collect()
    }

    /// Returns the regions configuration, if it resolves to one.
    ///
    /// A registered `Vec<Region>` is accepted as a static list.
    pub fn regions(&self) -> Option<RegionsSource> {
        let resolved = self.attr("regions")?;
        if let Some(source) = resolved.downcast_ref::<RegionsSource>() {
            return Some(source.clone());
        }
        resolved
            .downcast_ref::<Vec<Region>>()
            .map(|regions| RegionsSource::Static(regions.clone()))
    }

    /// Returns the form class the assembled form is built on.
    pub fn form_class(&self) -> PlugformResult<FormClass> {
        let resolved = self.attr("form_class").ok_or_else(|| self.missing("form_class"))?;
        resolved
            .downcast_ref::<FormClass>()
            .copied()
            .ok_or_else(|| self.unexpected("form_class", "a form class", resolved))
    }

    /// Returns the validation hook.
    pub fn validate(&self) -> PlugformResult<ValidateFn> {
        let resolved = self.attr("validate").ok_or_else(|| self.missing("validate"))?;
        resolved
            .downcast_ref::<ValidateFn>()
            .cloned()
            .ok_or_else(|| self.unexpected("validate", "a validation hook", resolved))
    }

    fn missing(&self, attribute: &str) -> PlugformError {
        PlugformError::ImproperlyConfigured(format!(
            "Form type {:?} has no {attribute:?} attribute",
            self.key
        ))
    }

    fn unexpected(&self, attribute: &str, expected: &str, found: &Resolved) -> PlugformError {
        let found = match found {
            Resolved::Text(text) => format!("{text:?}"),
            Resolved::Object(_) => "an object of another type".to_string(),
        };
        PlugformError::ImproperlyConfigured(format!(
            "Form type {:?} attribute {attribute:?} must be {expected}, got {found}",
            self.key
        ))
    }
}

impl fmt::Debug for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormType")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("attrs", &self.attr_names())
            .finish()
    }
}

/// Builder for [`FormType`].
#[derive(Default)]
pub struct FormTypeBuilder {
    key: Option<String>,
    label: Option<String>,
    attrs: BTreeMap<String, AttrSource>,
}

impl FormTypeBuilder {
    /// Sets the choice value.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the display label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets a static region list.
    #[must_use]
    pub fn regions(self, regions: Vec<Region>) -> Self {
        self.attr("regions", AttrSource::object(RegionsSource::Static(regions)))
    }

    /// Computes the regions from the configured form.
    #[must_use]
    pub fn regions_fn<F>(self, f: F) -> Self
    where
        F: Fn(&ConfiguredForm) -> Vec<Region> + Send + Sync + 'static,
    {
        self.attr(
            "regions",
            AttrSource::object(RegionsSource::Dynamic(Arc::new(f))),
        )
    }

    /// Sets the form class.
    #[must_use]
    pub fn form_class(self, form_class: FormClass) -> Self {
        self.attr("form_class", AttrSource::object(form_class))
    }

    /// Sets the validation hook.
    #[must_use]
    pub fn validate<F>(self, f: F) -> Self
    where
        F: Fn(&BaseForm) -> Vec<ValidationError> + Send + Sync + 'static,
    {
        self.attr("validate", AttrSource::object(validate_fn(f)))
    }

    /// Sets any attribute. Strings are resolved lazily as dotted paths.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrSource>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Builds the form type.
    ///
    /// Fails with [`PlugformError::ImproperlyConfigured`] if `key`, `label`
    /// or `regions` is missing. `form_class` defaults to the plain form and
    /// `validate` to a hook reporting nothing.
    pub fn build(self) -> PlugformResult<FormType> {
        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|name| match *name {
                "key" => self.key.is_none(),
                "label" => self.label.is_none(),
                other => !self.attrs.contains_key(other),
            })
            .collect();
        let (Some(key), Some(label)) = (self.key, self.label) else {
            return Err(missing_keys(&missing));
        };
        if !missing.is_empty() {
            return Err(missing_keys(&missing));
        }

        let mut attrs = self.attrs;
        attrs
            .entry("form_class".to_string())
            .or_insert_with(|| AttrSource::object(FormClass::EMPTY));
        attrs
            .entry("validate".to_string())
            .or_insert_with(|| AttrSource::object(no_validation()));

        Ok(FormType {
            key,
            label,
            attrs: attrs
                .into_iter()
                .map(|(name, source)| (name, Attribute::new(source)))
                .collect(),
        })
    }
}

fn missing_keys(missing: &[&str]) -> PlugformError {
    PlugformError::ImproperlyConfigured(format!(
        "Form type is missing required keys: {}",
        missing.join(", ")
    ))
}
