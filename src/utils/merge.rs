// Deep merge of configuration maps

use crate::models::guild::{ConfigMap, ConfigValue};

/// Merge `overlay` onto `base`, returning a new map.
///
/// Nested maps merge field by field; scalars, nulls and lists in `overlay`
/// replace the base value wholesale. Keys only present in `base` are kept.
///
/// Reads call this as `deep_merge(defaults, stored)` so stored values win
/// while missing sections still come from the defaults. Updates call it as
/// `deep_merge(current, partial)`.
pub fn deep_merge(base: &ConfigMap, overlay: &ConfigMap) -> ConfigMap {
    let mut output = base.clone();

    for (key, value) in overlay {
        let merged = match (output.get(key), value) {
            (Some(ConfigValue::Map(existing)), ConfigValue::Map(incoming)) => {
                ConfigValue::Map(deep_merge(existing, incoming))
            }
            _ => value.clone(),
        };
        output.insert(key.clone(), merged);
    }

    output
}

/// Drop keys from `update` that the `template` does not know about.
///
/// Recurses into sections present as maps on both sides; values the
/// template holds as scalars or lists are kept as given. A non-map value
/// for a section the template holds as a map is dropped, so a section can
/// only be edited field by field, never replaced by a scalar or null.
pub fn retain_known(update: &ConfigMap, template: &ConfigMap) -> (ConfigMap, Vec<String>) {
    let mut kept = ConfigMap::new();
    let mut dropped = Vec::new();

    for (key, value) in update {
        match (template.get(key), value) {
            (None, _) => dropped.push(key.clone()),
            (Some(ConfigValue::Map(known)), ConfigValue::Map(incoming)) => {
                let (inner, inner_dropped) = retain_known(incoming, known);
                dropped.extend(inner_dropped.into_iter().map(|k| format!("{}.{}", key, k)));
                kept.insert(key.clone(), ConfigValue::Map(inner));
            }
            (Some(ConfigValue::Map(_)), _) => dropped.push(key.clone()),
            (Some(_), _) => {
                kept.insert(key.clone(), value.clone());
            }
        }
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn map(value: Value) -> ConfigMap {
        match ConfigValue::from(value) {
            ConfigValue::Map(m) => m,
            other => panic!("expected object, got {:?}", other),
        }
    }

    fn value(map: ConfigMap) -> Value {
        ConfigValue::Map(map).into()
    }

    #[test]
    fn test_nested_sibling_preserved() {
        let base = map(json!({ "embed": { "title": "orig", "color": "#000" } }));
        let overlay = map(json!({ "embed": { "title": "X" } }));
        assert_eq!(
            value(deep_merge(&base, &overlay)),
            json!({ "embed": { "title": "X", "color": "#000" } })
        );
    }

    #[test]
    fn test_new_section_taken_verbatim() {
        let base = map(json!({ "a": 1 }));
        let overlay = map(json!({ "section": { "x": "y" } }));
        assert_eq!(
            value(deep_merge(&base, &overlay)),
            json!({ "a": 1, "section": { "x": "y" } })
        );
    }

    #[test]
    fn test_lists_replace() {
        let base = map(json!({ "ids": ["1", "2"] }));
        let overlay = map(json!({ "ids": ["3"] }));
        assert_eq!(value(deep_merge(&base, &overlay)), json!({ "ids": ["3"] }));
    }

    #[test]
    fn test_null_overrides() {
        let base = map(json!({ "url": "https://x", "keep": "k" }));
        let overlay = map(json!({ "url": null }));
        assert_eq!(
            value(deep_merge(&base, &overlay)),
            json!({ "url": null, "keep": "k" })
        );
    }

    #[test]
    fn test_map_replaces_scalar() {
        let base = map(json!({ "embed": "legacy" }));
        let overlay = map(json!({ "embed": { "title": "t" } }));
        assert_eq!(
            value(deep_merge(&base, &overlay)),
            json!({ "embed": { "title": "t" } })
        );
    }

    #[test]
    fn test_scalar_replaces_map() {
        let base = map(json!({ "embed": { "title": "t" } }));
        let overlay = map(json!({ "embed": "flat" }));
        assert_eq!(value(deep_merge(&base, &overlay)), json!({ "embed": "flat" }));
    }

    #[test]
    fn test_inputs_untouched() {
        let base = map(json!({ "embed": { "title": "orig" } }));
        let overlay = map(json!({ "embed": { "title": "new" } }));
        let base_before = base.clone();
        let overlay_before = overlay.clone();
        let _ = deep_merge(&base, &overlay);
        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let base = map(json!({ "a": 1, "s": { "x": 1, "y": [1, 2] } }));
        let overlay = map(json!({ "s": { "x": 2 }, "b": null }));
        let once = deep_merge(&base, &overlay);
        assert_eq!(deep_merge(&once, &overlay), once);
        assert_eq!(deep_merge(&once, &once), once);
    }

    #[test]
    fn test_retain_known_drops_unknown_keys() {
        let template = map(json!({ "a": null, "s": { "x": 1 }, "ids": [] }));
        let update = map(json!({ "a": "1", "zzz": 2, "s": { "x": 5, "junk": true }, "ids": ["9"] }));
        let (kept, dropped) = retain_known(&update, &template);
        assert_eq!(value(kept), json!({ "a": "1", "s": { "x": 5 }, "ids": ["9"] }));
        assert_eq!(dropped, vec!["s.junk".to_string(), "zzz".to_string()]);
    }

    #[test]
    fn test_retain_known_keeps_sections_as_maps() {
        let template = map(json!({ "embed": { "title": "t" }, "url": null }));
        let update = map(json!({ "embed": null, "url": "https://x" }));
        let (kept, dropped) = retain_known(&update, &template);
        assert_eq!(value(kept), json!({ "url": "https://x" }));
        assert_eq!(dropped, vec!["embed".to_string()]);

        let update = map(json!({ "embed": "flat" }));
        let (kept, dropped) = retain_known(&update, &template);
        assert!(kept.is_empty());
        assert_eq!(dropped, vec!["embed".to_string()]);
    }
}
