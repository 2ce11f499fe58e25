//! Differ - Detect which top-level fields changed between prior state and desired config

use crate::resource::AttributeMap;

/// Find changed attributes between desired config and prior state.
///
/// A key present on only one side counts as changed. The result is sorted.
pub fn changed_attributes(prior: &AttributeMap, desired: &AttributeMap) -> Vec<String> {
    let mut changed = Vec::new();

    for (key, desired_value) in desired {
        // Skip internal attributes (starting with _)
        if key.starts_with('_') {
            continue;
        }

        match prior.get(key) {
            Some(prior_value) if prior_value == desired_value => {}
            _ => changed.push(key.clone()),
        }
    }

    for key in prior.keys() {
        if !key.starts_with('_') && !desired.contains_key(key) {
            changed.push(key.clone());
        }
    }

    changed.sort();
    changed
}
