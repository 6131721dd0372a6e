//! Template rendering utilities using Tera
//!
//! Views build a JSON context and hand it to [`render_template`] together with
//! the template source. Template names never end in `.html`, so Tera does not
//! autoescape and the output is plain terminal text.

use serde_json::Value;
use tera::{Context, Tera};

use crate::{Error, Result};

/// Render a template string with the given context
pub fn render_template(name: &str, template: &str, context: &Value) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, template)
        .map_err(|e| Error::Template(format!("Failed to parse template '{}': {}", name, e)))?;

    let mut tera_context = Context::new();

    // Add all fields from the JSON value to the context
    match context {
        Value::Object(map) => {
            for (key, value) in map {
                tera_context.insert(key, &value);
            }
        }
        _ => {
            // If not an object, make it available as "data"
            tera_context.insert("data", &context);
        }
    }

    tera.render(name, &tera_context)
        .map_err(|e| Error::Template(format!("Failed to render template '{}': {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_template() {
        let context = json!({
            "title": "Senior Actuary",
            "company": "ABC Insurance",
        });

        let result = render_template("line", "{{ title }} at {{ company }}", &context).unwrap();
        assert_eq!(result, "Senior Actuary at ABC Insurance");
    }

    #[test]
    fn test_render_non_object_context() {
        let result = render_template("count", "Total: {{ data }}", &json!(4)).unwrap();
        assert_eq!(result, "Total: 4");
    }

    #[test]
    fn test_no_html_escaping() {
        let result = render_template("raw", "{{ v }}", &json!({ "v": "R&D <Pricing>" })).unwrap();
        assert_eq!(result, "R&D <Pricing>");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = render_template("broken", "{% if %}", &json!({})).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }
}
