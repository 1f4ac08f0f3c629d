//! Built-in note templates and template lookup.

use once_cell::sync::Lazy;
use tracing::warn;

use crate::records::Template;
use crate::store::RecordStore;

pub const DEFAULT_TEMPLATE_ID: &str = "default_soap";

const SOAP_EXAMPLE: &str = "\
SUBJECTIVE:
Patient presents for [reason]. Reports [symptoms/concerns].

OBJECTIVE:
Exam findings: [clinical observations]
Teeth examined: [tooth numbers]
Radiographs: [if applicable]

ASSESSMENT:
[Diagnosis and clinical impression]

PLAN:
1. [Treatment performed]
2. [Follow-up recommendations]
3. [Next appointment]";

const HYGIENE_EXAMPLE: &str = "\
SUBJECTIVE:
Patient presents for routine prophylaxis. [Any concerns reported]

OBJECTIVE:
Probing depths: [findings]
Bleeding on probing: [yes/no, locations]
Plaque score: [percentage]
Calculus: [light/moderate/heavy]

ASSESSMENT:
[Periodontal status]

PLAN:
1. Prophylaxis completed
2. Fluoride treatment: [yes/no]
3. OHI provided
4. Return in [timeframe]";

const LIMITED_EXAMPLE: &str = "\
CHIEF COMPLAINT:
[Patient's primary concern in their words]

HISTORY OF PRESENT ILLNESS:
Onset: [when symptoms started]
Duration: [how long]
Character: [sharp/dull/throbbing]
Location: [specific tooth/area]
Aggravating factors: [hot/cold/biting]
Relieving factors: [what helps]

CLINICAL FINDINGS:
[Exam observations]

RADIOGRAPHIC FINDINGS:
[X-ray interpretation]

DIAGNOSIS:
[Clinical diagnosis]

TREATMENT PROVIDED:
[Procedures performed today]

RECOMMENDATIONS:
[Follow-up care needed]";

fn builtin(template_id: &str, name: &str, description: &str, example_output: &str) -> Template {
    Template {
        template_id: template_id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        example_output: example_output.to_string(),
        is_default: true,
        created_by: None,
        created_at: None,
        updated_at: None,
        updated_by: None,
    }
}

/// Always available, never stored, never editable.
pub static DEFAULT_TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    vec![
        builtin(
            DEFAULT_TEMPLATE_ID,
            "SOAP General",
            "Standard SOAP format for general dentistry visits",
            SOAP_EXAMPLE,
        ),
        builtin(
            "default_hygiene",
            "Hygiene Recall",
            "Template for routine cleaning and hygiene visits",
            HYGIENE_EXAMPLE,
        ),
        builtin(
            "default_limited",
            "Limited Exam (Emergency)",
            "Template for emergency/limited examination visits",
            LIMITED_EXAMPLE,
        ),
    ]
});

pub fn default_template(template_id: &str) -> Option<&'static Template> {
    DEFAULT_TEMPLATES.iter().find(|t| t.template_id == template_id)
}

pub fn is_default_template(template_id: &str) -> bool {
    default_template(template_id).is_some()
}

fn soap_template() -> Template {
    DEFAULT_TEMPLATES[0].clone()
}

/// Template to generate a note with: a built-in, then a stored one, then
/// SOAP. Store failures fall back rather than failing the generation.
pub async fn resolve_template(store: &dyn RecordStore, template_id: &str) -> Template {
    if let Some(template) = default_template(template_id) {
        return template.clone();
    }
    match store.get_template(template_id).await {
        Ok(Some(template)) => template,
        Ok(None) => soap_template(),
        Err(e) => {
            warn!(template_id, error = %e, "template lookup failed, using SOAP");
            soap_template()
        }
    }
}
