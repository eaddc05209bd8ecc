//! Fixed ad-script template and its renderer.
//!
//! Placeholders are written `{{name}}` and substituted in a single pass, so
//! forum text that happens to contain braces is never expanded again.

use adsynth_core::{InsightSet, ProductInfo, Prompt};
use tracing::debug;

pub const AD_SCRIPT_TEMPLATE: &str = "\
You are an expert copywriter creating a viral social media ad script.

PRODUCT INFORMATION:
Product Name: {{product_name}}
Product Description: {{product_description}}
Target Audience: {{target_audience}}
Use Cases: {{key_use_cases}}
Niche: {{niche}}
Campaign Goal: {{campaign_goal}}

INSIGHTS FROM AUDIENCE ANALYSIS ({{source_count}} discussions reviewed):
Pain Points:
{{pain_points}}
Audience Language: {{trending_terms}}

Based on these insights, create a compelling ad script that:
1. Addresses the key pain points identified
2. Uses language and terminology familiar to the target audience
3. Clearly communicates the product's value proposition
4. Includes a strong call-to-action

Your ad script should be 150-200 words and structured for a social media ad:
- Attention-grabbing opening
- Problem statement
- Solution (product introduction)
- Benefits
- Call-to-action

AD SCRIPT:
";

const NOT_SPECIFIED: &str = "Not specified";
const DEFAULT_PRODUCT_NAME: &str = "our product";
const NO_PAIN_POINTS: &str = "- No specific pain points were identified; focus on general frustrations of the audience.";
const NO_TRENDING_TERMS: &str = "No recurring terms were identified.";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            template: AD_SCRIPT_TEMPLATE.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Renders the template. Identical inputs always give identical bytes.
    pub fn build(&self, insights: &InsightSet, product: Option<&ProductInfo>) -> Prompt {
        let product = product.cloned().unwrap_or_default();
        let pain_points = if insights.pain_points.is_empty() {
            NO_PAIN_POINTS.to_string()
        } else {
            insights
                .pain_points
                .iter()
                .map(|point| format!("- {}", point))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let trending_terms = if insights.trending_terms.is_empty() {
            NO_TRENDING_TERMS.to_string()
        } else {
            insights.trending_terms.join(", ")
        };
        let source_count = insights.source_thread_ids.len().to_string();

        let rendered = render(&self.template, |name| match name {
            "product_name" => Some(or_default(&product.product_name, DEFAULT_PRODUCT_NAME)),
            "product_description" => Some(or_default(&product.product_description, NOT_SPECIFIED)),
            "target_audience" => Some(or_default(&product.target_audience, NOT_SPECIFIED)),
            "key_use_cases" => Some(or_default(&product.key_use_cases, NOT_SPECIFIED)),
            "niche" => Some(or_default(&product.niche, NOT_SPECIFIED)),
            "campaign_goal" => Some(or_default(&product.campaign_goal, NOT_SPECIFIED)),
            "pain_points" => Some(pain_points.as_str()),
            "trending_terms" => Some(trending_terms.as_str()),
            "source_count" => Some(source_count.as_str()),
            _ => None,
        });

        debug!("Built prompt of {} characters", rendered.len());
        Prompt::new(rendered)
    }
}

/// Builds a prompt with the default template.
pub fn build(insights: &InsightSet, product: Option<&ProductInfo>) -> Prompt {
    PromptBuilder::default().build(insights, product)
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Substitutes every `{{name}}` the lookup knows. Unknown placeholders are
/// kept verbatim.
fn render<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let name = after_open[..end].trim();
                match lookup(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
