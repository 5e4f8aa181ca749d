// src/common/serde_utils.rs

use serde::{Deserialize, Deserializer};

/// Distingue campo ausente de `null` em payloads de atualização parcial.
///
/// Usar com `#[serde(default, deserialize_with = "double_option")]`:
/// ausente → `None`, `null` → `Some(None)`, valor → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        campo: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"campo": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"campo": "x"}"#).unwrap();

        assert_eq!(absent.campo, None);
        assert_eq!(null.campo, Some(None));
        assert_eq!(value.campo, Some(Some("x".to_string())));
    }
}
