//! Instruction prompt for financial document analysis.
//!
//! The prompt is a fixed constant: every request sends the same text ahead of
//! the page images. The document-type choice a user may make in a front end
//! ([`DocumentType`]) only selects example questions and is never sent to
//! the model.

/// Expands to the refusal literal so it can be spliced into the prompt with
/// `concat!` and still be exported on its own.
macro_rules! non_financial_refusal {
    () => {
        "I'm sorry, but this appears to be a non-financial document. I can only analyze financial documents such as:
- Invoices and Receipts
- Financial Statements (Income Statements, Balance Sheets, Cash Flow Statements)
- Annual Reports and Quarterly Reports
- Budget Documents and Forecasts
- Tax Documents and Bank Statements

Please upload a financial document for analysis."
    };
}

/// Exact reply the model must give for a document that is not financial.
pub const NON_FINANCIAL_REFUSAL: &str = non_financial_refusal!();

/// Instruction prompt placed before the pages in every analysis request.
pub const FINANCIAL_ANALYSIS_PROMPT: &str = concat!(
    r#"You are an expert AI assistant specializing in financial document analysis. Your primary role is to accurately answer any question about the provided financial document, whether the question requires simple data extraction or complex financial calculations.

---
### **Rule 0: Be Direct and Concise**
- Your primary goal is to provide a direct answer to the user's specific question.
- Provide details if the user asks for a summary or details.
- If the user asks for the date or total, provide ONLY the date or total amount.

---
### **Rule 1: Document Validation**
First, verify the image is a financial document. If the uploaded image is NOT a financial document (e.g., memes, general images, social media posts), you MUST respond with EXACTLY this text and nothing else:

""#,
    non_financial_refusal!(),
    r#""

---
### **Rule 2: Answering User Questions**
If the document is financial, your task is to answer the user's question based on its content. Your capabilities include:

**A. Simple Data Extraction (Primary Task):**
- This is your most common task. You will find and report specific pieces of information from the document.
- **Examples:** "What is the invoice date?", "What is the total amount due?", "List the item descriptions.", "Who is the customer?"

**B. Financial Calculations (Advanced Task):**
- If the user's question requires a calculation, perform it accurately using data from the document.
- **Examples:**
  - Gross Margin = (Revenue - Cost of Goods Sold) / Revenue
  - Net Profit Margin = Net Income / Revenue
  - Current Ratio = Current Assets / Current Liabilities
  - And any other requested financial metric.

---
### **Rule 3: Response Guidelines**
- **Synthesize Across Pages:** If multiple images (like PDF pages) are provided, treat them as one continuous document.
- **Show Your Work:** For calculations, briefly explain the formula and the values you used (e.g., "Calculated Gross Margin using Revenue of $1,000 and COGS of $400").
- **Be Factual:** Base your entire response ONLY on the information visible in the provided image(s). Do not use external knowledge.
- **Handle Missing Information:** If the document doesn't contain the data needed to answer, clearly state what information is missing.
- **Format Numbers Clearly:** Use appropriate formatting like commas, currency symbols, and percentages.
"#
);

/// Kind of document the user says they are uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentType {
    #[default]
    AutoDetect,
    InvoiceOrReceipt,
    FinancialStatement,
    AnnualReport,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::AutoDetect,
        DocumentType::InvoiceOrReceipt,
        DocumentType::FinancialStatement,
        DocumentType::AnnualReport,
        DocumentType::Other,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            DocumentType::AutoDetect => "Auto-detect",
            DocumentType::InvoiceOrReceipt => "Invoice/Receipt",
            DocumentType::FinancialStatement => "Financial Statement",
            DocumentType::AnnualReport => "Annual Report",
            DocumentType::Other => "Other Financial Document",
        }
    }

    /// Suggested questions for this kind of document. Empty when there are none.
    pub fn example_questions(self) -> &'static [&'static str] {
        match self {
            DocumentType::FinancialStatement => &[
                "What is the P/E ratio for 2024?",
                "Calculate the debt-to-equity ratio",
                "What was the net profit margin?",
                "Show me the revenue growth from 2023 to 2024",
            ],
            DocumentType::InvoiceOrReceipt => &[
                "What is the total amount due?",
                "Calculate the tax amount",
                "What are the payment terms?",
                "When is this invoice due?",
            ],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_refusal_verbatim() {
        assert!(FINANCIAL_ANALYSIS_PROMPT.contains(NON_FINANCIAL_REFUSAL));
        assert!(FINANCIAL_ANALYSIS_PROMPT.contains(&format!("\"{NON_FINANCIAL_REFUSAL}\"")));
    }

    #[test]
    fn prompt_covers_required_rules() {
        for needle in [
            "Be Direct and Concise",
            "Document Validation",
            "Net Profit Margin = Net Income / Revenue",
            "treat them as one continuous document",
            "Show Your Work",
            "Handle Missing Information",
        ] {
            assert!(
                FINANCIAL_ANALYSIS_PROMPT.contains(needle),
                "prompt is missing {needle:?}"
            );
        }
    }

    #[test]
    fn refusal_ends_with_call_to_action() {
        assert!(NON_FINANCIAL_REFUSAL.starts_with("I'm sorry"));
        assert!(NON_FINANCIAL_REFUSAL.ends_with("Please upload a financial document for analysis."));
    }

    #[test]
    fn example_questions_only_for_known_types() {
        assert_eq!(DocumentType::default(), DocumentType::AutoDetect);
        assert!(DocumentType::AutoDetect.example_questions().is_empty());
        assert!(DocumentType::Other.example_questions().is_empty());
        assert!(DocumentType::InvoiceOrReceipt
            .example_questions()
            .contains(&"What is the total amount due?"));
        assert_eq!(DocumentType::FinancialStatement.example_questions().len(), 4);
        assert_eq!(DocumentType::ALL.len(), 5);
    }
}
