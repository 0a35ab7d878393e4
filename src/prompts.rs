//! Prompt template for receipt field extraction.
//!
//! Callers can override the default via [`crate::config::ScanConfig::prompt_template`];
//! the constant here is used only when no override is provided.

/// Placeholder replaced with the OCR text.
pub const RECEIPT_TEXT_PLACEHOLDER: &str = "{receipt_text}";

/// Default instruction template. Asks for six fields back as JSON.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"
Extract the following fields from this receipt:
- Date
- Total Amount
- Tax Amount
- Payment Method
- Vendor Name
- Receipt Number (if available)

Make sure your response is valid JSON with these keys.

Receipt Text:
{receipt_text}
"#;

/// Substitute `text` into `template`.
///
/// The text is inserted verbatim: no escaping, no length limit.
pub fn build_prompt(template: &str, text: &str) -> String {
    template.replace(RECEIPT_TEXT_PLACEHOLDER, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_lists_all_fields() {
        for field in [
            "Date",
            "Total Amount",
            "Tax Amount",
            "Payment Method",
            "Vendor Name",
            "Receipt Number",
        ] {
            assert!(DEFAULT_PROMPT_TEMPLATE.contains(field), "missing {field}");
        }
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("valid JSON"));
    }

    #[test]
    fn text_is_inserted_verbatim() {
        let text = "Total: $12.50 {braces} \"quotes\"\nline two";
        let prompt = build_prompt(DEFAULT_PROMPT_TEMPLATE, text);
        assert!(prompt.contains(text));
        assert!(!prompt.contains(RECEIPT_TEXT_PLACEHOLDER));
        assert!(prompt.trim_end().ends_with("line two"));
    }

    #[test]
    fn custom_template() {
        assert_eq!(build_prompt("<<{receipt_text}>>", "abc"), "<<abc>>");
    }
}
