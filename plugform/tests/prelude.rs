//! End-to-end check through the re-exported surface.

use std::sync::LazyLock;

use plugform::core::utils::MultiValueDict;
use plugform::models::assemble::run_loaders;
use plugform::models::loading::create_plugin_tables;
use plugform::prelude::*;

static TEXT: LazyLock<PluginMeta> =
    LazyLock::new(|| SimpleField::proxy_meta::<proxies::Text>("site", "site_simplefield"));

static FORMS: LazyLock<ConfiguredFormMeta> = LazyLock::new(|| {
    ConfiguredFormMeta::new(
        "site_configuredform",
        vec![FormType::builder()
            .key("feedback")
            .label("feedback form")
            .regions(vec![Region::new("form", "form")])
            .build()
            .unwrap()],
    )
});

#[test]
fn test_feedback_form() {
    let db = SqliteBackend::memory().unwrap();
    let kinds = [SimpleField::kind(&TEXT)];
    db.execute_batch(&FORMS.create_table_sql()).unwrap();
    create_plugin_tables(&db, &kinds).unwrap();

    let mut configured = ConfiguredForm::new(&FORMS, "Feedback", "feedback");
    FORMS.save(&db, &mut configured).unwrap();
    let mut comment = SimpleField::new(
        &TEXT,
        PluginBase::new(configured.id.unwrap(), "form", 10),
        FormField::new("comment", "Comment"),
    );
    comment.save(&db).unwrap();

    let plugins = configured.load_plugins(&db, &kinds).unwrap();
    let mut form = configured
        .create_form(&plugins, &FieldContext::creating())
        .unwrap();
    form.bind(&MultiValueDict::from_pairs([("comment", "Great site")]));
    assert!(form.is_valid());

    let values: Vec<LoadedValue> = run_loaders(&plugins, form.cleaned_data()).unwrap();
    assert_eq!(values[0].label, "Comment");
    assert_eq!(values[0].value, Value::from("Great site"));
}
