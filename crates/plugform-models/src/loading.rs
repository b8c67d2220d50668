//! Loading plugin rows of a configured form.

use std::collections::HashSet;

use plugform_core::PlugformResult;
use plugform_db::DatabaseBackend;

use crate::configured_form::ConfiguredForm;
use crate::meta::PluginKind;
use crate::plugin::FormFieldPlugin;

/// Creates the tables of the given plugin kinds. Proxy kinds sharing a
/// table create it once.
pub fn create_plugin_tables(db: &dyn DatabaseBackend, kinds: &[PluginKind]) -> PlugformResult<()> {
    let mut seen = HashSet::new();
    for kind in kinds {
        if seen.insert(kind.meta.db_table()) {
            db.execute_batch(&kind.meta.create_table_sql())?;
        }
    }
    Ok(())
}

/// Loads every row of `kinds` attached to `parent_id`, ordered by the
/// content editor's `ordering`. Rows with equal ordering keep the order of
/// `kinds`.
pub fn load_plugins(
    db: &dyn DatabaseBackend,
    parent_id: i64,
    kinds: &[PluginKind],
) -> PlugformResult<Vec<Box<dyn FormFieldPlugin>>> {
    let mut plugins = Vec::new();
    for kind in kinds {
        let (sql, params) = kind.meta.select_for_parent(parent_id);
        for row in db.query(&sql, &params)? {
            plugins.push(kind.instantiate(row)?);
        }
    }
    plugins.sort_by_key(|p| p.base().ordering);
    tracing::debug!(
        configured_form = parent_id,
        kinds = kinds.len(),
        plugins = plugins.len(),
        "loaded plugins"
    );
    Ok(plugins)
}

impl ConfiguredForm {
    /// Loads this form's plugin rows of the given kinds, in editor order.
    pub fn load_plugins(
        &self,
        db: &dyn DatabaseBackend,
        kinds: &[PluginKind],
    ) -> PlugformResult<Vec<Box<dyn FormFieldPlugin>>> {
        load_plugins(db, self.require_id()?, kinds)
    }
}
