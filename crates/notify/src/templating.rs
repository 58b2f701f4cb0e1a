//! Minijinja rendering of notification body templates.
//!
//! Templates are files on disk referenced by the rule configuration.
//! Each render reads the file and evaluates it against the rule's
//! variables, so template edits take effect on the next run without any
//! cache invalidation.

use std::path::Path;

use serde_json::{Map, Value};

use crate::traits::NotifyError;

/// Renders notification templates using minijinja.
///
/// A fresh [`minijinja::Environment`] is created per render call since
/// template sources are re-read per run, not pre-registered.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.add_filter("datetime", datetime_filter);
        env
    }

    /// Read and render the template file at `path` with `variables`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] when the file cannot be read or
    /// the template fails to evaluate.
    pub fn render_file(
        &self,
        path: &Path,
        variables: &Map<String, Value>,
    ) -> Result<String, NotifyError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            NotifyError::Template(format!("cannot read template {}: {}", path.display(), e))
        })?;
        self.render_str(&source, variables)
    }

    /// Render a template source string with `variables`.
    pub fn render_str(
        &self,
        source: &str,
        variables: &Map<String, Value>,
    ) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(source, variables)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }
}

/// Filter: format an RFC 3339 timestamp string, default
/// `%Y-%m-%dT%H:%M:%S%z`. Unparseable input passes through unchanged.
fn datetime_filter(value: String, format: Option<String>) -> String {
    let format = format.unwrap_or_else(|| "%Y-%m-%dT%H:%M:%S%z".to_string());
    match chrono::DateTime::parse_from_rfc3339(&value) {
        Ok(dt) => dt.format(&format).to_string(),
        Err(_) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn render_str_substitutes_variables() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[("name", Value::String("queue".to_string()))]);
        let out = renderer.render_str("Alerts for {{ name }}", &variables).unwrap();
        assert_eq!(out, "Alerts for queue");
    }

    #[test]
    fn render_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{% for a in alerts %}}{{{{ a.message }}}};{{% endfor %}}").unwrap();
        file.flush().unwrap();

        let alerts = serde_json::json!([{ "message": "m1" }, { "message": "m2" }]);
        let variables = vars(&[("alerts", alerts)]);

        let renderer = TemplateRenderer::new();
        let out = renderer.render_file(file.path(), &variables).unwrap();
        assert_eq!(out, "m1;m2;");
    }

    #[test]
    fn missing_template_file_is_a_template_error() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render_file(Path::new("/nonexistent/template.txt"), &Map::new())
            .unwrap_err();
        assert!(matches!(err, NotifyError::Template(_)));
    }

    #[test]
    fn invalid_template_syntax_errors() {
        let renderer = TemplateRenderer::new();
        let err = renderer.render_str("{{ unclosed", &Map::new()).unwrap_err();
        assert!(matches!(err, NotifyError::Template(_)));
    }

    #[test]
    fn datetime_filter_formats_timestamps() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[(
            "ts",
            Value::String("2026-03-01T12:30:00+00:00".to_string()),
        )]);
        let out = renderer
            .render_str("{{ ts | datetime('%Y-%m-%d') }}", &variables)
            .unwrap();
        assert_eq!(out, "2026-03-01");
    }

    #[test]
    fn datetime_filter_passes_through_garbage() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[("ts", Value::String("yesterday".to_string()))]);
        let out = renderer
            .render_str("{{ ts | datetime }}", &variables)
            .unwrap();
        assert_eq!(out, "yesterday");
    }
}
