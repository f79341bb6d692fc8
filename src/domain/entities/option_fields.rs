use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::ValidateLength;

/// Represents optional field semantics in PATCH/UPDATE requests.
///
/// - `Unchanged` → field absent from the request body
/// - `SetToNull` → explicit `null`
/// - `SetToValue` → set to provided value
///
/// Use together with `#[serde(default)]` on the containing struct so absent
/// keys land on `Unchanged`.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

// ---------------------- Validation support ----------------------

impl<T> ValidateLength<u64> for OptionField<T>
where
    T: ValidateLength<u64>
{
    fn length(&self) -> Option<u64> {
        match self {
            OptionField::SetToValue(value) => value.length(),
            _ => None,
        }
    }

    fn validate_length(&self, min: Option<u64>, max: Option<u64>, equal: Option<u64>) -> bool {
        match self {
            OptionField::SetToValue(value) => value.validate_length(min, max, equal),
            _ => true,
        }
    }
}

impl<T: Serialize> OptionField<T> {
    /// Writes the field into a document patch: nothing for `Unchanged`,
    /// `null` for `SetToNull`, the serialized value otherwise.
    pub fn write_into(&self, patch: &mut Map<String, Value>, key: &str) {
        match self {
            OptionField::Unchanged => {}
            OptionField::SetToNull => {
                patch.insert(key.to_string(), Value::Null);
            }
            OptionField::SetToValue(value) => {
                if let Ok(json) = serde_json::to_value(value) {
                    patch.insert(key.to_string(), json);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct Patch {
        title: OptionField<String>,
        image: OptionField<String>,
        featured: OptionField<bool>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let patch: Patch = serde_json::from_value(json!({"image": null, "featured": true})).unwrap();

        assert_eq!(patch.title, OptionField::Unchanged);
        assert_eq!(patch.image, OptionField::SetToNull);
        assert_eq!(patch.featured, OptionField::SetToValue(true));
    }

    #[test]
    fn write_into_skips_unchanged_fields() {
        let patch: Patch = serde_json::from_value(json!({"title": "New", "image": null})).unwrap();
        let mut out = Map::new();
        patch.title.write_into(&mut out, "title");
        patch.image.write_into(&mut out, "image");
        patch.featured.write_into(&mut out, "featured");

        assert_eq!(Value::Object(out), json!({"title": "New", "image": null}));
    }

    #[test]
    fn length_only_checks_set_values() {
        let unchanged: OptionField<String> = OptionField::Unchanged;
        let short = OptionField::SetToValue("ab".to_string());

        assert!(unchanged.validate_length(Some(3), None, None));
        assert!(!short.validate_length(Some(3), None, None));
    }
}
