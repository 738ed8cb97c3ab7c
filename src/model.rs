use serde::Serialize;
use serde_json::Value;

/// Artifacts recovered from one page
///
/// `microdata` is `None` on the static path, where the key is omitted from
/// the JSON output entirely. The browser path always sets it, to
/// `Some(None)` (serialized as `null`) when the page carries no ingredients.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(rename = "contents")]
    pub raw_html: String,
    pub clean_text: String,
    #[serde(rename = "jsonLd")]
    pub structured_data: Vec<Value>,
    #[serde(rename = "ogImage")]
    pub preview_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microdata: Option<Option<Microdata>>,
}

/// Recipe fields marked up with schema.org microdata attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Microdata {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}
