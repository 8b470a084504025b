use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::{Duration, Instant};

use super::{TranslateError, TranslateResult, Translator};

/// Google's web endpoint used by the translate.google.com widgets.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
/// Longest input accepted by the endpoint, in characters.
pub const MAX_INPUT_CHARS: usize = 5_000;

const USER_AGENT_VALUE: &str = concat!("g-translator/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_ERROR_BODY_PREVIEW: usize = 300;

/// Translator backed by the public Google Translate `gtx` client endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String> {
        let chars = text.chars().count();
        if chars > MAX_INPUT_CHARS {
            return Err(TranslateError::new(format!(
                "Text is too long ({} characters, limit {})",
                chars, MAX_INPUT_CHARS
            )));
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(text.to_string());
        }

        let sl = google_language_code(source);
        let tl = google_language_code(target);
        if tl.is_empty() {
            return Err(TranslateError::new("No target language selected"));
        }

        let started = Instant::now();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", sl.as_str()),
                ("tl", tl.as_str()),
                ("dt", "t"),
                ("q", trimmed),
            ])
            .send()
            .map_err(|e| TranslateError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TranslateError::new(format!("Failed to read response: {}", e)))?;
        tracing::debug!(
            "translate {} -> {}: HTTP {} in {} ms",
            sl,
            tl,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(TranslateError {
                message: format!("Service rejected request: {}", preview(&body)),
                status: Some(status.as_u16()),
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| TranslateError::new(format!("Malformed response: {}", e)))?;
        extract_translation(&value)
            .ok_or_else(|| TranslateError::new("Response did not contain a translation"))
    }
}

/// Map the codes stored in settings to the ones the endpoint expects.
pub fn google_language_code(code: &str) -> String {
    let trimmed = code.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "zh-cn" => "zh-CN".to_string(),
        "zh-tw" => "zh-TW".to_string(),
        "auto" => "auto".to_string(),
        other => other.to_string(),
    }
}

/// The endpoint answers with nested arrays: `[[["Hallo","Hello",..],..],..]`.
/// The translation is the concatenation of the first string of each segment.
fn extract_translation(value: &Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let mut out = String::new();
    for seg in segments {
        if let Some(piece) = seg.get(0).and_then(Value::as_str) {
            out.push_str(piece);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty body)".to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_ERROR_BODY_PREVIEW).collect();
    if trimmed.chars().count() > MAX_ERROR_BODY_PREVIEW {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_all_segments() {
        let v = json!([
            [
                ["Hallo Welt. ", "Hello world. ", null, null, 10],
                ["Wie geht's?", "How are you?", null, null, 3]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            extract_translation(&v).as_deref(),
            Some("Hallo Welt. Wie geht's?")
        );
    }

    #[test]
    fn unexpected_shape_is_none() {
        assert_eq!(extract_translation(&json!({"error": "nope"})), None);
        assert_eq!(extract_translation(&json!([null, null, "en"])), None);
        assert_eq!(extract_translation(&json!([[]])), None);
    }

    #[test]
    fn maps_chinese_variants() {
        assert_eq!(google_language_code("zh-cn"), "zh-CN");
        assert_eq!(google_language_code(" DE "), "de");
        assert_eq!(google_language_code("auto"), "auto");
    }

    #[test]
    fn rejects_oversized_input_without_network() {
        let t = GoogleTranslator::with_endpoint("http://127.0.0.1:9/unused").unwrap();
        let text = "a".repeat(MAX_INPUT_CHARS + 1);
        let err = t.translate(&text, "auto", "de").unwrap_err();
        assert!(err.message.contains("too long"));
    }

    #[test]
    fn whitespace_is_returned_unchanged() {
        let t = GoogleTranslator::with_endpoint("http://127.0.0.1:9/unused").unwrap();
        assert_eq!(t.translate("  \n", "auto", "de").unwrap(), "  \n");
    }

    #[test]
    fn error_preview_is_bounded() {
        let long = "x".repeat(MAX_ERROR_BODY_PREVIEW * 2);
        assert_eq!(preview(&long).chars().count(), MAX_ERROR_BODY_PREVIEW + 1);
        assert_eq!(preview("  "), "(empty body)");
    }
}
