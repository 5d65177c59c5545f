//! Firmographic profile extraction from scraped text

use crate::discovery::SearchEvidence;
use crate::oracle::parse::extract_json_object;
use crate::oracle::Oracle;
use crate::scrape::ScrapedPage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Extracted company facts; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub software_classification: Option<String>,
    pub enterprise_grade: Option<String>,
    pub industry: Option<String>,
    pub customers: Option<String>,
    pub employee_head_count: Option<String>,
    pub investors: Option<String>,
    pub geography: Option<String>,
    pub parent_company: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub finance: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Ledger column, JSON answer key and answer kind of each profile field
pub const PROFILE_FIELDS: [(&str, &str, &str); 15] = [
    ("software_classification", "software_classification", "string"),
    ("enterprise_grade", "is_enterprise_grade", "string"),
    ("industry", "industry", "string"),
    ("customers", "customer_name_list", "list"),
    ("employee_head_count", "employee_head_count", "number"),
    ("investors", "investors_list", "list"),
    ("geography", "geography", "string"),
    ("parent_company", "parent_company", "string"),
    ("street", "street", "string"),
    ("postal_code", "postal/zip_code", "string"),
    ("city", "city", "string"),
    ("country", "country/region", "string"),
    ("finance", "finance", "string"),
    ("email", "email", "string"),
    ("phone", "phone_number", "string"),
];

impl CompanyProfile {
    /// Map an answer object onto the profile
    pub fn from_answer(answer: &Map<String, Value>) -> Self {
        let mut profile = CompanyProfile::default();
        for (column, key, _) in PROFILE_FIELDS {
            if let Some(slot) = profile.slot_mut(column) {
                *slot = answer.get(key).and_then(value_text);
            }
        }
        profile
    }

    /// `(column, value)` pairs in ledger column order
    pub fn columns(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("software_classification", self.software_classification.as_deref()),
            ("enterprise_grade", self.enterprise_grade.as_deref()),
            ("industry", self.industry.as_deref()),
            ("customers", self.customers.as_deref()),
            ("employee_head_count", self.employee_head_count.as_deref()),
            ("investors", self.investors.as_deref()),
            ("geography", self.geography.as_deref()),
            ("parent_company", self.parent_company.as_deref()),
            ("street", self.street.as_deref()),
            ("postal_code", self.postal_code.as_deref()),
            ("city", self.city.as_deref()),
            ("country", self.country.as_deref()),
            ("finance", self.finance.as_deref()),
            ("email", self.email.as_deref()),
            ("phone", self.phone.as_deref()),
        ]
    }

    pub fn filled(&self) -> usize {
        self.columns().iter().filter(|(_, v)| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }

    fn slot_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
        let slot = match column {
            "software_classification" => &mut self.software_classification,
            "enterprise_grade" => &mut self.enterprise_grade,
            "industry" => &mut self.industry,
            "customers" => &mut self.customers,
            "employee_head_count" => &mut self.employee_head_count,
            "investors" => &mut self.investors,
            "geography" => &mut self.geography,
            "parent_company" => &mut self.parent_company,
            "street" => &mut self.street,
            "postal_code" => &mut self.postal_code,
            "city" => &mut self.city,
            "country" => &mut self.country,
            "finance" => &mut self.finance,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            _ => return None,
        };
        Some(slot)
    }
}

/// Flatten an answer value to text; null-like values are absent
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty() && !s.eq_ignore_ascii_case("null")).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Builds the extraction prompt and parses the oracle's JSON answer
pub struct ProfileExtractor<'a> {
    oracle: &'a dyn Oracle,
    max_context_chars: usize,
}

impl<'a> ProfileExtractor<'a> {
    pub fn new(oracle: &'a dyn Oracle, max_context_chars: usize) -> Self {
        Self {
            oracle,
            max_context_chars,
        }
    }

    /// Extract a profile; any failure is an empty profile
    pub async fn extract(&self, evidence: &SearchEvidence, pages: &[ScrapedPage]) -> CompanyProfile {
        let context = self.context(evidence, pages);
        debug!("Extraction context: {} chars", context.len());

        let answer = match self.oracle.generate(&extraction_prompt(&context)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Extraction failed: {}", e);
                return CompanyProfile::default();
            }
        };

        match extract_json_object(&answer) {
            Some(object) => {
                let profile = CompanyProfile::from_answer(&object);
                info!("Extracted {} of {} fields", profile.filled(), PROFILE_FIELDS.len());
                profile
            }
            None => {
                warn!("No valid JSON in extraction answer");
                CompanyProfile::default()
            }
        }
    }

    fn context(&self, evidence: &SearchEvidence, pages: &[ScrapedPage]) -> String {
        let mut context = String::new();
        for (topic, snippet) in &evidence.contexts {
            context.push_str(&format!("=== search: {} ===\n{}\n\n", topic.label(), snippet));
        }
        for page in pages {
            context.push_str(&format!("=== page: {} ===\n{}\n\n", page.url, page.text));
        }
        truncate_chars(&context, self.max_context_chars).to_string()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn extraction_prompt(context: &str) -> String {
    let schema: String = PROFILE_FIELDS
        .iter()
        .map(|(_, key, kind)| format!("{}: <{}>\n", key, kind))
        .collect();

    format!(
        "You are a data extraction model. Extract the following information from the context provided.\n\
         Answer with a single JSON object using the keys below. Use null for values you don't know \
         and do not add any explanation or other text.\n\n\
         {schema}\n\
         CONTEXT:\n\
         {context}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SearchTopic;
    use crate::oracle::testing::ScriptedOracle;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_from_answer_flattens_values() {
        let answer = object(json!({
            "industry": "Industrial machinery",
            "is_enterprise_grade": "enterprise grade",
            "customer_name_list": ["Globex", "Initech", null],
            "employee_head_count": 250,
            "investors_list": [],
            "postal/zip_code": "EC1A 1BB",
            "country/region": "United Kingdom",
            "email": "null",
            "phone_number": "  ",
            "parent_company": null
        }));

        let profile = CompanyProfile::from_answer(&answer);
        assert_eq!(profile.industry.as_deref(), Some("Industrial machinery"));
        assert_eq!(profile.enterprise_grade.as_deref(), Some("enterprise grade"));
        assert_eq!(profile.customers.as_deref(), Some("Globex, Initech"));
        assert_eq!(profile.employee_head_count.as_deref(), Some("250"));
        assert_eq!(profile.postal_code.as_deref(), Some("EC1A 1BB"));
        assert_eq!(profile.country.as_deref(), Some("United Kingdom"));
        assert_eq!(profile.investors, None);
        assert_eq!(profile.email, None);
        assert_eq!(profile.phone, None);
        assert_eq!(profile.parent_company, None);
        assert_eq!(profile.filled(), 6);
    }

    #[test]
    fn test_columns_match_field_table() {
        let profile = CompanyProfile::default();
        let columns: Vec<&str> = profile.columns().iter().map(|(c, _)| *c).collect();
        let table: Vec<&str> = PROFILE_FIELDS.iter().map(|(c, _, _)| *c).collect();
        assert_eq!(columns, table);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn test_extract_uses_snippets_and_pages() {
        let oracle = ScriptedOracle::new([
            "```json\n{\"industry\": \"Widgets\", \"city\": \"London\"}\n```",
        ]);
        let extractor = ProfileExtractor::new(&oracle, 10_000);
        let evidence = SearchEvidence {
            contexts: vec![(SearchTopic::Industry, "Acme makes widgets".to_string())],
            ..SearchEvidence::default()
        };
        let pages = vec![ScrapedPage {
            url: "https://acme.com/contact".to_string(),
            text: "1 Main Street, London".to_string(),
        }];

        let profile = extractor.extract(&evidence, &pages).await;
        assert_eq!(profile.industry.as_deref(), Some("Widgets"));
        assert_eq!(profile.city.as_deref(), Some("London"));

        let prompt = &oracle.prompts()[0];
        for (_, key, kind) in PROFILE_FIELDS {
            assert!(prompt.contains(&format!("{}: <{}>", key, kind)), "missing {}", key);
        }
        assert!(prompt.contains("customer_name_list: <list>"));
        assert!(prompt.contains("Acme makes widgets"));
        assert!(prompt.contains("=== page: https://acme.com/contact ==="));
    }

    #[tokio::test]
    async fn test_extract_failures_are_empty() {
        let extractor_oracle = ScriptedOracle::new(["I'm sorry, I cannot help with that."]);
        let extractor = ProfileExtractor::new(&extractor_oracle, 100);
        assert!(extractor
            .extract(&SearchEvidence::default(), &[])
            .await
            .is_empty());

        let failing = ScriptedOracle::failing();
        let extractor = ProfileExtractor::new(&failing, 100);
        assert!(extractor
            .extract(&SearchEvidence::default(), &[])
            .await
            .is_empty());
    }
}
