use crate::error::{DuplicateNameErr, InvalidPropertyErr, SchemaError, SourceAndComponentsErr};
use crate::template::{COMPONENT_NAMES, TEMPLATE_KEYS, Template};
use snafu::ensure;

/// Checks the shape of a single template level. Sub-materials are checked when
/// they are compiled.
pub fn validate(template: &Template) -> Result<(), SchemaError> {
    ensure!(
        template.components().is_none() || template.source().is_none(),
        SourceAndComponentsErr
    );

    if let Some(key) = template.unknown_keys().first() {
        return InvalidPropertyErr {
            property: key,
            expected: TEMPLATE_KEYS.join(", "),
        }
        .fail();
    }

    for (channel, _) in template.components().unwrap_or_default() {
        ensure!(
            COMPONENT_NAMES.contains(&channel.as_str()),
            InvalidPropertyErr {
                property: channel,
                expected: COMPONENT_NAMES.join(", "),
            }
        );
    }

    for (name, _) in template.uniforms() {
        ensure!(template.material(name).is_none(), DuplicateNameErr { name });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: serde_json::Value) -> Result<(), SchemaError> {
        validate(&Template::try_from(value).unwrap())
    }

    #[test]
    fn accepts_well_formed_templates() {
        check(json!({
            "type": "Wrapped",
            "uniforms": { "strength": 1.0 },
            "materials": { "inner": { "source": "body" } },
            "components": { "diffuse": "inner.diffuse * strength" }
        }))
        .unwrap();
        check(json!({})).unwrap();
    }

    #[test]
    fn rejects_source_with_components() {
        let err = check(json!({ "source": "s", "components": { "diffuse": "d" } })).unwrap_err();
        assert!(matches!(err, SchemaError::SourceAndComponents));
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let err = check(json!({ "uniform": { "a": 1 } })).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidProperty { property, .. } if property == "uniform"));
    }

    #[test]
    fn rejects_unknown_components() {
        let err = check(json!({ "components": { "roughness": "0.5" } })).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidProperty { property, .. } if property == "roughness"));
    }

    #[test]
    fn rejects_shared_names() {
        let err = check(json!({
            "uniforms": { "inner": 1.0 },
            "materials": { "inner": { "source": "s" } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { name } if name == "inner"));
    }
}
