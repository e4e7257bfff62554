// Prompt constants for document-level semantic analysis.

/// System prompt for the document analysis call. The user message carries the
/// flattened page text and table cells.
pub const DOCUMENT_ANALYSIS_SYSTEM: &str = "You are an expert document analyzer. \
    Analyze the provided content and extract key information. Identify: \
    1. Document type (invoice, form, report, etc.) \
    2. Key entities (people, companies, places) \
    3. Important dates and amounts \
    4. Main purpose of the document \
    5. Any notable observations. \
    Format your response as a structured JSON object with these sections. \
    Do NOT include any text outside the JSON object.";
