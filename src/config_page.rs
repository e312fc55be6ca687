// Configuration page shown to the instructor inside Inven!RA.
//
// The page has no submit button: Inven!RA reads the form controls directly,
// so every control's `id` and `name` must match a parameter name.

use std::fmt::{self, Write};

use serde::Serialize;

use crate::catalog::{ParamType, ParameterDefinition};
use crate::value::ParamValue;

pub const ACTIVITY_NAME: &str = "Sopa de Letras";
pub const ACTIVITY_DESCRIPTION: &str =
    "Jogo de sopa de letras para praticar vocabulário num idioma alvo.";
pub const ACTIVITY_LANGUAGE: &str = "pt";

/// JSON rendition of the configuration page.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigMetadata {
    pub activity_id: Option<String>,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub language: &'static str,
    pub config_fields: Vec<String>,
}

pub fn metadata(params: &[ParameterDefinition], activity_id: Option<&str>) -> ConfigMetadata {
    ConfigMetadata {
        activity_id: activity_id.map(str::to_string),
        name: ACTIVITY_NAME,
        description: ACTIVITY_DESCRIPTION,
        version: env!("CARGO_PKG_VERSION"),
        language: ACTIVITY_LANGUAGE,
        config_fields: params.iter().map(|p| p.name.clone()).collect(),
    }
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn default_text(param: &ParameterDefinition) -> String {
    match &param.default {
        None => String::new(),
        Some(ParamValue::Text(s)) => s.clone(),
        Some(ParamValue::Int(n)) => n.to_string(),
        Some(ParamValue::Bool(b)) => b.to_string(),
        Some(ParamValue::Json(v)) => serde_json::to_string_pretty(v).unwrap_or_default(),
    }
}

/// Text parameters with a short single-line default render as a text input.
const SHORT_TEXT_MAX: usize = 60;

fn is_short_text(param: &ParameterDefinition) -> bool {
    match &param.default {
        Some(ParamValue::Text(s)) => !s.contains('\n') && s.chars().count() <= SHORT_TEXT_MAX,
        None => true,
        Some(_) => false,
    }
}

fn render_field(out: &mut String, param: &ParameterDefinition) -> fmt::Result {
    let name = escape_html(&param.name);
    let label = escape_html(param.label.as_deref().unwrap_or(&param.name));
    let value = escape_html(&default_text(param));
    let required = if param.required { " required" } else { "" };

    match param.kind {
        ParamType::Boolean => {
            let checked = matches!(param.default, Some(ParamValue::Bool(true)));
            writeln!(
                out,
                r#"    <div class="checkbox-group">
        <input id="{name}" name="{name}" type="checkbox"{} />
        <label for="{name}" class="inline">{label}</label>
    </div>"#,
                if checked { " checked" } else { "" }
            )
        }
        ParamType::Integer => {
            let mut bounds = String::new();
            if let Some(min) = param.min {
                write!(bounds, r#" min="{min}""#)?;
            }
            if let Some(max) = param.max {
                write!(bounds, r#" max="{max}""#)?;
            }
            writeln!(
                out,
                r#"    <label for="{name}">{label}</label>
    <input id="{name}" name="{name}" type="number" value="{value}"{bounds}{required} />"#
            )
        }
        ParamType::Text if !is_short_text(param) => writeln!(
            out,
            r#"    <label for="{name}">{label}</label>
    <textarea id="{name}" name="{name}" rows="3"{required}>{value}</textarea>"#
        ),
        ParamType::String | ParamType::Text => writeln!(
            out,
            r#"    <label for="{name}">{label}</label>
    <input id="{name}" name="{name}" type="text" value="{value}"{required} />"#
        ),
        ParamType::Json => writeln!(
            out,
            r#"    <label for="{name}">{label}</label>
    <textarea id="{name}" name="{name}" rows="8" spellcheck="false"{required}>{value}</textarea>"#
        ),
    }
}

/// Render the HTML form, one control per parameter in catalog order.
pub fn render_html(
    params: &[ParameterDefinition],
    activity_id: Option<&str>,
) -> Result<String, fmt::Error> {
    let mut body = String::new();
    if let Some(id) = activity_id {
        writeln!(
            body,
            r#"    <input id="activityID" name="activityID" type="hidden" value="{}" />"#,
            escape_html(id)
        )?;
    }
    for param in params {
        render_field(&mut body, param)?;
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="{ACTIVITY_LANGUAGE}">
<head>
    <meta charset="UTF-8" />
    <title>Configuração – {ACTIVITY_NAME}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 1.5rem; }}
        h1 {{ font-size: 1.4rem; }}
        label {{ display: block; margin-top: 0.8rem; font-weight: bold; }}
        label.inline {{ display: inline; font-weight: normal; }}
        input[type="text"], input[type="number"], textarea {{
            width: 100%; max-width: 600px; padding: 0.3rem; margin-top: 0.2rem;
        }}
        .checkbox-group {{ margin-top: 0.5rem; }}
    </style>
</head>
<body>
    <h1>Configuração da Atividade – {ACTIVITY_NAME}</h1>
{body}</body>
</html>
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn test_every_parameter_has_a_control() {
        let html = render_html(catalog::parameters(), None).unwrap();
        for p in catalog::parameters() {
            assert!(
                html.contains(&format!(r#"name="{}""#, p.name)),
                "missing control for {}",
                p.name
            );
        }
        assert!(!html.contains("<button"));
        assert!(!html.contains(r#"name="activityID""#));
    }

    #[test]
    fn test_defaults_and_bounds_are_rendered() {
        let html = render_html(catalog::parameters(), None).unwrap();
        assert!(html.contains(r#"type="number" value="12" min="6" max="20""#));
        assert!(html.contains(r#"name="permitirDiagonais" type="checkbox" checked"#));
        assert!(html.contains(r#"name="sensivelMaiusculas" type="checkbox" />"#));
        assert!(html.contains("&quot;idioma_alvo&quot;"));
    }

    #[test]
    fn test_short_text_renders_as_input() {
        let html = render_html(catalog::parameters(), None).unwrap();
        assert!(html.contains(
            r#"<input id="nome" name="nome" type="text" value="Sopa de Letras – Vocabulário" required />"#
        ));
        assert!(html.contains(r#"<textarea id="orientacoes" name="orientacoes" rows="3">"#));
        assert!(!html.contains(r#"<textarea id="nome""#));
    }

    #[test]
    fn test_activity_id_is_escaped() {
        let html = render_html(catalog::parameters(), Some(r#"x"><script>"#)).unwrap();
        assert!(html.contains(r#"value="x&quot;&gt;&lt;script&gt;""#));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_metadata_lists_fields_in_order() {
        let meta = metadata(catalog::parameters(), Some("abc123"));
        assert_eq!(meta.activity_id.as_deref(), Some("abc123"));
        assert_eq!(meta.config_fields.first().map(String::as_str), Some("nome"));
        assert_eq!(meta.config_fields.len(), 7);
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
    }
}
