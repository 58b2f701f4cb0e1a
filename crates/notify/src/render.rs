//! Composition of a dispatch batch into a ready-to-send notification.

use std::path::Path;

use courier_core::AlertRecord;
use serde_json::{Map, Value};

use crate::attachment::AlertLog;
use crate::templating::TemplateRenderer;
use crate::traits::NotifyError;

/// A materialized notification: rendered bodies, the final template
/// variables, and the scoped attachment log.
///
/// The attachment file lives exactly as long as this value.
#[derive(Debug)]
pub struct RenderedNotification {
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
    /// Variables the bodies were rendered with, including the injected
    /// `alerts` batch.
    pub variables: Map<String, Value>,
    pub attachment: AlertLog,
}

/// Render `alerts` (non-empty) through the rule's templates.
///
/// The fetched batch is injected into the variables under the key
/// `alerts`; a user-supplied value under that key is overwritten (last
/// write wins, by contract). At least one of the two templates must be
/// given; validation guarantees this for rules coming through the
/// pipeline.
pub fn render_notification(
    renderer: &TemplateRenderer,
    subject: &str,
    template_text: Option<&Path>,
    template_html: Option<&Path>,
    variables: &Map<String, Value>,
    alerts: &[AlertRecord],
) -> Result<RenderedNotification, NotifyError> {
    if template_text.is_none() && template_html.is_none() {
        return Err(NotifyError::Config(
            "a notification requires a text or html template".to_string(),
        ));
    }

    let mut variables = variables.clone();
    let batch =
        serde_json::to_value(alerts).map_err(|e| NotifyError::Template(e.to_string()))?;
    variables.insert("alerts".to_string(), batch);

    let text_body = template_text
        .map(|path| renderer.render_file(path, &variables))
        .transpose()?;
    let html_body = template_html
        .map(|path| renderer.render_file(path, &variables))
        .transpose()?;

    let attachment = AlertLog::write(alerts)?;

    Ok(RenderedNotification {
        subject: subject.to_string(),
        text_body,
        html_body,
        variables,
        attachment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn template_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn injected_alerts_equal_the_fetched_batch() {
        let alerts = vec![AlertRecord::new("g1", "m1"), AlertRecord::new("g1", "m2")];
        let template = template_file("{% for a in alerts %}{{ a.message }} {% endfor %}");

        let rendered = render_notification(
            &TemplateRenderer::new(),
            "Subject",
            Some(template.path()),
            None,
            &Map::new(),
            &alerts,
        )
        .unwrap();

        assert_eq!(rendered.text_body.as_deref(), Some("m1 m2 "));
        assert!(rendered.html_body.is_none());
        assert_eq!(
            rendered.variables.get("alerts").unwrap(),
            &serde_json::to_value(&alerts).unwrap()
        );
    }

    #[test]
    fn prior_alerts_variable_is_overwritten() {
        let alerts = vec![AlertRecord::new("g1", "real")];
        let template = template_file("{{ alerts[0].message }}");

        let mut variables = Map::new();
        variables.insert(
            "alerts".to_string(),
            Value::String("user-supplied".to_string()),
        );

        let rendered = render_notification(
            &TemplateRenderer::new(),
            "Subject",
            Some(template.path()),
            None,
            &variables,
            &alerts,
        )
        .unwrap();

        assert_eq!(rendered.text_body.as_deref(), Some("real"));
    }

    #[test]
    fn both_templates_render_both_bodies() {
        let alerts = vec![AlertRecord::new("g1", "m")];
        let text = template_file("text: {{ alerts | length }}");
        let html = template_file("<b>{{ alerts | length }}</b>");

        let rendered = render_notification(
            &TemplateRenderer::new(),
            "Subject",
            Some(text.path()),
            Some(html.path()),
            &Map::new(),
            &alerts,
        )
        .unwrap();

        assert_eq!(rendered.text_body.as_deref(), Some("text: 1"));
        assert_eq!(rendered.html_body.as_deref(), Some("<b>1</b>"));
    }

    #[test]
    fn no_template_at_all_is_a_config_error() {
        let alerts = vec![AlertRecord::new("g1", "m")];
        let err = render_notification(
            &TemplateRenderer::new(),
            "Subject",
            None,
            None,
            &Map::new(),
            &alerts,
        )
        .unwrap_err();
        assert!(matches!(err, NotifyError::Config(_)));
    }

    #[test]
    fn attachment_is_removed_when_notification_drops() {
        let alerts = vec![AlertRecord::new("g1", "m")];
        let template = template_file("x");

        let rendered = render_notification(
            &TemplateRenderer::new(),
            "Subject",
            Some(template.path()),
            None,
            &Map::new(),
            &alerts,
        )
        .unwrap();

        let path = rendered.attachment.path().to_path_buf();
        assert!(path.exists());
        drop(rendered);
        assert!(!path.exists());
    }
}
