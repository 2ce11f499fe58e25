//! Validators for App Service arguments

use std::sync::LazyLock;

use appservice_core::resource::Value;
use appservice_core::schema::AttributeType;
use regex::Regex;

use crate::parse::{ServicePlanId, WebAppId};

static WEB_APP_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z-]{0,58}[0-9A-Za-z]$").ok());

/// Site names are 2-60 characters of letters, digits and hyphens, and may not
/// start or end with a hyphen
pub fn web_app_name(value: &Value) -> Result<(), String> {
    let Value::String(name) = value else {
        return Err("Expected string".to_string());
    };
    let valid = WEB_APP_NAME
        .as_ref()
        .is_some_and(|re| re.is_match(name));
    if valid {
        Ok(())
    } else {
        Err(format!(
            "{:?} must be between 2 and 60 characters in length and contain only letters, numbers and hyphens, and may not start or end with a hyphen",
            name
        ))
    }
}

pub fn service_plan_id(value: &Value) -> Result<(), String> {
    let Value::String(id) = value else {
        return Err("Expected string".to_string());
    };
    ServicePlanId::parse(id).map(|_| ()).map_err(|e| e.to_string())
}

pub fn web_app_id(value: &Value) -> Result<(), String> {
    let Value::String(id) = value else {
        return Err("Expected string".to_string());
    };
    WebAppId::parse(id).map(|_| ()).map_err(|e| e.to_string())
}

pub fn web_app_name_type() -> AttributeType {
    AttributeType::Custom {
        name: "WebAppName".to_string(),
        base: Box::new(AttributeType::String),
        validate: web_app_name,
    }
}

pub fn service_plan_id_type() -> AttributeType {
    AttributeType::Custom {
        name: "ServicePlanId".to_string(),
        base: Box::new(AttributeType::String),
        validate: service_plan_id,
    }
}

pub fn web_app_id_type() -> AttributeType {
    AttributeType::Custom {
        name: "WebAppId".to_string(),
        base: Box::new(AttributeType::String),
        validate: web_app_id,
    }
}

/// String enum from a fixed list of values
pub fn one_of(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn web_app_names() {
        assert!(web_app_name(&s("app1")).is_ok());
        assert!(web_app_name(&s("my-web-app-01")).is_ok());
        assert!(web_app_name(&s("ab")).is_ok());
        assert!(web_app_name(&s(&"a".repeat(60))).is_ok());

        assert!(web_app_name(&s("a")).is_err());
        assert!(web_app_name(&s(&"a".repeat(61))).is_err());
        assert!(web_app_name(&s("-app")).is_err());
        assert!(web_app_name(&s("app-")).is_err());
        assert!(web_app_name(&s("my_app")).is_err());
        assert!(web_app_name(&Value::Int(1)).is_err());
    }

    #[test]
    fn service_plan_ids() {
        assert!(
            service_plan_id(&s(
                "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Web/serverfarms/plan1"
            ))
            .is_ok()
        );
        assert!(
            service_plan_id(&s(
                "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Web/sites/app1"
            ))
            .is_err()
        );
    }

    #[test]
    fn custom_type_validates_through_schema() {
        let ty = web_app_name_type();
        assert!(ty.validate(&s("app1")).is_ok());
        assert!(ty.validate(&s("-bad")).is_err());
        assert!(ty.validate(&Value::Bool(true)).is_err());
    }
}
