//! `BaseForm` and form classes.
//!
//! [`BaseForm`] is a form whose field set is supplied at runtime. It binds
//! submitted data, runs field-level cleaning, then runs its [`Cleaner`]s in
//! order as one form-level pass. A cleaner sees the live form, returns the
//! (possibly adjusted) cleaned-data mapping, or fails with a
//! [`ValidationError`] attached to a field or to the form as a whole.
//!
//! [`FormClass`] is the static "base form" a dynamic form is built on:
//! declared fields plus an optional `clean` hook.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use plugform_core::utils::MultiValueDict;
use plugform_core::{ValidationError, NON_FIELD_ERRORS};
use plugform_db::Value;

use crate::fields::FormFieldDef;
use crate::validation;

/// The cleaned data of a form, keyed by field name.
pub type CleanedData = HashMap<String, Value>;

/// A form-level validation hook.
///
/// Receives the form after field-level cleaning and returns the cleaned
/// data that replaces the form's current mapping.
pub type Cleaner = Arc<dyn Fn(&BaseForm) -> Result<CleanedData, ValidationError> + Send + Sync>;

/// A statically declared form class.
///
/// # Examples
///
/// ```
/// use plugform_forms::{FormClass, FormFieldDef, FormFieldType};
///
/// fn declared() -> Vec<FormFieldDef> {
///     vec![FormFieldDef::new("subject", FormFieldType::char(Some(100)))]
/// }
///
/// const CONTACT: FormClass = FormClass::new("ContactForm", declared);
/// let form = CONTACT.instantiate(Vec::new(), Default::default(), Vec::new());
/// assert_eq!(form.fields()[0].name, "subject");
/// ```
#[derive(Clone, Copy)]
pub struct FormClass {
    /// The class name, for diagnostics.
    pub name: &'static str,
    /// Produces the declared fields, in declaration order.
    pub declared_fields: fn() -> Vec<FormFieldDef>,
    /// The class's own `clean` hook, run before any other cleaner.
    pub clean: Option<fn(&BaseForm) -> Result<CleanedData, ValidationError>>,
}

fn no_fields() -> Vec<FormFieldDef> {
    Vec::new()
}

impl FormClass {
    /// The plain form: no declared fields, no `clean` hook.
    pub const EMPTY: Self = Self::new("Form", no_fields);

    /// Creates a form class without a `clean` hook.
    pub const fn new(name: &'static str, declared_fields: fn() -> Vec<FormFieldDef>) -> Self {
        Self {
            name,
            declared_fields,
            clean: None,
        }
    }

    /// Sets the `clean` hook.
    #[must_use]
    pub const fn with_clean(
        mut self,
        clean: fn(&BaseForm) -> Result<CleanedData, ValidationError>,
    ) -> Self {
        self.clean = Some(clean);
        self
    }

    /// Builds a form from this class plus dynamically supplied fields.
    ///
    /// Declared fields come first, dynamic fields after them in the given
    /// order. A dynamic field named like an earlier field replaces it in
    /// place. The class's `clean` hook runs before `cleaners`.
    pub fn instantiate(
        &self,
        fields: Vec<FormFieldDef>,
        initial: HashMap<String, Value>,
        cleaners: Vec<Cleaner>,
    ) -> BaseForm {
        let mut all = (self.declared_fields)();
        for field in fields {
            merge_field(&mut all, field);
        }
        let mut form = BaseForm::new(all).with_initial(initial);
        if let Some(clean) = self.clean {
            form.add_cleaner(Arc::new(clean));
        }
        for cleaner in cleaners {
            form.add_cleaner(cleaner);
        }
        form
    }
}

impl fmt::Debug for FormClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormClass")
            .field("name", &self.name)
            .field("has_clean", &self.clean.is_some())
            .finish_non_exhaustive()
    }
}

/// Inserts `field`, replacing a field of the same name in place.
///
/// Returns `true` if an existing field was replaced.
pub fn merge_field(fields: &mut Vec<FormFieldDef>, field: FormFieldDef) -> bool {
    if let Some(existing) = fields.iter_mut().find(|f| f.name == field.name) {
        *existing = field;
        true
    } else {
        fields.push(field);
        false
    }
}

/// A general-purpose form built from a list of field definitions.
pub struct BaseForm {
    field_defs: Vec<FormFieldDef>,
    initial_data: HashMap<String, Value>,
    cleaners: Vec<Cleaner>,
    bound: bool,
    raw_data: HashMap<String, Vec<String>>,
    errors: HashMap<String, Vec<String>>,
    cleaned_data: CleanedData,
}

impl BaseForm {
    /// Creates a new `BaseForm` with the given field definitions.
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            field_defs: fields,
            initial_data: HashMap::new(),
            cleaners: Vec::new(),
            bound: false,
            raw_data: HashMap::new(),
            errors: HashMap::new(),
            cleaned_data: HashMap::new(),
        }
    }

    /// Sets initial (default) values for fields.
    #[must_use]
    pub fn with_initial(mut self, initial: HashMap<String, Value>) -> Self {
        self.initial_data = initial;
        self
    }

    /// Appends a form-level cleaner.
    pub fn add_cleaner(&mut self, cleaner: Cleaner) {
        self.cleaners.push(cleaner);
    }

    /// Returns the number of registered cleaners.
    pub fn cleaner_count(&self) -> usize {
        self.cleaners.len()
    }

    /// Returns the form's field definitions in order.
    pub fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    /// Returns the field with the given name.
    pub fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.field_defs.iter().find(|f| f.name == name)
    }

    /// Returns the field names in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.field_defs.iter().map(|f| f.name.as_str()).collect()
    }

    /// Returns the form-level initial values.
    pub fn initial(&self) -> &HashMap<String, Value> {
        &self.initial_data
    }

    /// Returns the initial value of a field: the form-level initial value,
    /// else the field's own.
    pub fn initial_for(&self, name: &str) -> Option<&Value> {
        self.initial_data
            .get(name)
            .or_else(|| self.field(name).and_then(|f| f.initial.as_ref()))
    }

    /// Binds submitted data to this form, clearing previous results.
    pub fn bind(&mut self, data: &MultiValueDict<String, String>) {
        self.bound = true;
        self.raw_data.clear();
        self.errors.clear();
        self.cleaned_data.clear();

        for field in &self.field_defs {
            let values = field.widget.value_from_data(data, &field.name);
            self.raw_data.insert(field.name.clone(), values);
        }
    }

    /// Returns `true` if this form has been bound to data.
    pub const fn is_bound(&self) -> bool {
        self.bound
    }

    /// Validates the form. Returns `true` if valid.
    ///
    /// Field-level cleaning runs first; the cleaners then run in order even
    /// when some fields failed, each seeing the cleaned data accumulated so
    /// far.
    pub fn is_valid(&mut self) -> bool {
        if !self.bound {
            return false;
        }

        self.errors.clear();
        self.cleaned_data.clear();

        validation::clean_fields(
            &self.field_defs,
            &self.raw_data,
            &self.initial_data,
            &mut self.cleaned_data,
            &mut self.errors,
        );

        let cleaners = self.cleaners.clone();
        for cleaner in cleaners {
            match cleaner(self) {
                Ok(data) => self.cleaned_data = data,
                Err(error) => self.add_error(None, error),
            }
        }

        self.errors.is_empty()
    }

    /// Attaches a validation error to a field, or to the whole form when
    /// `field` is `None` and the error carries no per-field errors.
    ///
    /// A field that receives an error is removed from the cleaned data.
    pub fn add_error(&mut self, field: Option<&str>, error: ValidationError) {
        for (key, messages) in error.into_messages(field) {
            if key != NON_FIELD_ERRORS {
                self.cleaned_data.remove(&key);
            }
            self.errors.entry(key).or_default().extend(messages);
        }
    }

    /// Returns per-field validation errors. Form-level errors are stored
    /// under [`NON_FIELD_ERRORS`].
    pub fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    /// Returns the non-field (form-level) errors.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get(NON_FIELD_ERRORS).map_or(&[], Vec::as_slice)
    }

    /// Returns the cleaned (validated and coerced) data.
    pub fn cleaned_data(&self) -> &CleanedData {
        &self.cleaned_data
    }

    /// Returns the raw values bound for a field.
    pub fn raw_value(&self, name: &str) -> &[String] {
        self.raw_data.get(name).map_or(&[], Vec::as_slice)
    }

    /// Renders a field's widget with the bound data, or its initial value
    /// when unbound.
    pub fn render_field(&self, name: &str) -> Option<String> {
        let field = self.field(name)?;
        let values = if self.bound {
            self.raw_value(name).to_vec()
        } else {
            match self.initial_for(name) {
                Some(Value::List(items)) => items.iter().map(ToString::to_string).collect(),
                Some(Value::Null) | None => Vec::new(),
                Some(value) => vec![value.to_string()],
            }
        };
        Some(field.render(&values))
    }
}

impl fmt::Debug for BaseForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseForm")
            .field("fields", &self.field_names())
            .field("cleaners", &self.cleaners.len())
            .field("bound", &self.bound)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FormFieldType;

    fn make_test_form() -> BaseForm {
        BaseForm::new(vec![
            FormFieldDef::new("username", FormFieldType::char(Some(20))),
            FormFieldDef::new("email", FormFieldType::Email),
            FormFieldDef::new(
                "age",
                FormFieldType::Integer {
                    min_value: Some(0),
                    max_value: Some(150),
                },
            )
            .required(false),
        ])
    }

    fn data(pairs: &[(&str, &str)]) -> MultiValueDict<String, String> {
        MultiValueDict::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_form_unbound() {
        let mut form = make_test_form();
        assert!(!form.is_bound());
        assert!(!form.is_valid());
    }

    #[test]
    fn test_form_bind_and_validate() {
        let mut form = make_test_form();
        form.bind(&data(&[
            ("username", "alice"),
            ("email", "alice@example.com"),
            ("age", "30"),
        ]));
        assert!(form.is_valid());
        assert_eq!(form.cleaned_data().get("username"), Some(&Value::from("alice")));
        assert_eq!(form.cleaned_data().get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_form_required_field_missing() {
        let mut form = make_test_form();
        form.bind(&data(&[("age", "25")]));
        assert!(!form.is_valid());
        assert!(form.errors().contains_key("username"));
        assert!(form.errors().contains_key("email"));
    }

    #[test]
    fn test_cleaners_run_in_order_and_replace_data() {
        let mut form = make_test_form();
        form.add_cleaner(Arc::new(|form: &BaseForm| {
            let mut data = form.cleaned_data().clone();
            data.insert("step".into(), Value::from("one"));
            Ok(data)
        }));
        form.add_cleaner(Arc::new(|form: &BaseForm| {
            let mut data = form.cleaned_data().clone();
            let previous = data.get("step").map(ToString::to_string).unwrap_or_default();
            data.insert("step".into(), Value::from(format!("{previous}+two")));
            Ok(data)
        }));
        form.bind(&data(&[("username", "a"), ("email", "a@example.com")]));
        assert!(form.is_valid());
        assert_eq!(form.cleaned_data()["step"], Value::from("one+two"));
    }

    #[test]
    fn test_cleaner_form_level_error() {
        let mut form = make_test_form();
        form.add_cleaner(Arc::new(|_: &BaseForm| {
            Err(ValidationError::new("Something is off.", "invalid"))
        }));
        form.bind(&data(&[("username", "a"), ("email", "a@example.com")]));
        assert!(!form.is_valid());
        assert_eq!(form.non_field_errors(), &["Something is off.".to_string()]);
    }

    #[test]
    fn test_cleaner_field_error_removes_cleaned_value() {
        let mut form = make_test_form();
        form.add_cleaner(Arc::new(|_: &BaseForm| {
            Err(ValidationError::for_field("username", "Taken.", "unique"))
        }));
        form.bind(&data(&[("username", "a"), ("email", "a@example.com")]));
        assert!(!form.is_valid());
        assert_eq!(form.errors()["username"], vec!["Taken.".to_string()]);
        assert!(!form.cleaned_data().contains_key("username"));
        assert!(form.non_field_errors().is_empty());
    }

    #[test]
    fn test_cleaners_run_despite_field_errors() {
        let mut form = make_test_form();
        form.add_cleaner(Arc::new(|form: &BaseForm| {
            assert!(!form.cleaned_data().contains_key("email"));
            Ok(form.cleaned_data().clone())
        }));
        form.bind(&data(&[("username", "a"), ("email", "bad")]));
        assert!(!form.is_valid());
        assert!(form.errors().contains_key("email"));
    }

    #[test]
    fn test_form_rebind_clears_state() {
        let mut form = make_test_form();
        form.bind(&data(&[("username", "ab")]));
        assert!(!form.is_valid());
        assert!(!form.errors().is_empty());

        form.bind(&data(&[("username", "alice"), ("email", "alice@example.com")]));
        assert!(form.is_valid());
        assert!(form.errors().is_empty());
    }

    fn declared() -> Vec<FormFieldDef> {
        vec![
            FormFieldDef::new("subject", FormFieldType::char(None)),
            FormFieldDef::new("body", FormFieldType::char(None)),
        ]
    }

    fn reject_all(_: &BaseForm) -> Result<CleanedData, ValidationError> {
        Err(ValidationError::new("class clean", "invalid"))
    }

    #[test]
    fn test_form_class_instantiate_order_and_replacement() {
        let class = FormClass::new("Declared", declared);
        let form = class.instantiate(
            vec![
                FormFieldDef::new("extra", FormFieldType::Email),
                FormFieldDef::new("subject", FormFieldType::Email),
            ],
            HashMap::new(),
            Vec::new(),
        );
        assert_eq!(form.field_names(), vec!["subject", "body", "extra"]);
        assert_eq!(form.field("subject").unwrap().field_type, FormFieldType::Email);
    }

    #[test]
    fn test_form_class_clean_runs_first() {
        let class = FormClass::new("Declared", declared).with_clean(reject_all);
        let later: Cleaner = Arc::new(|form: &BaseForm| {
            assert_eq!(form.non_field_errors(), &["class clean".to_string()]);
            Ok(form.cleaned_data().clone())
        });
        let mut form = class.instantiate(Vec::new(), HashMap::new(), vec![later]);
        assert_eq!(form.cleaner_count(), 2);
        form.bind(&data(&[("subject", "s"), ("body", "b")]));
        assert!(!form.is_valid());
    }

    #[test]
    fn test_empty_form_class() {
        let form = FormClass::EMPTY.instantiate(Vec::new(), HashMap::new(), Vec::new());
        assert!(form.fields().is_empty());
        assert_eq!(form.cleaner_count(), 0);
    }

    #[test]
    fn test_initial_for_and_render_unbound() {
        let mut initial = HashMap::new();
        initial.insert("username".to_string(), Value::from("bob"));
        let form = make_test_form().with_initial(initial);
        assert_eq!(form.initial_for("username"), Some(&Value::from("bob")));
        assert!(form.initial_for("age").is_none());
        let html = form.render_field("username").unwrap();
        assert!(html.contains("value=\"bob\""));
        assert!(form.render_field("missing").is_none());
    }
}
