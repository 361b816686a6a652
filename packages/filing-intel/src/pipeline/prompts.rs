//! Prompt templates and text budgeting for model calls.
//!
//! Templates use `{name}` placeholders filled in a single pass by
//! [`render`], so braces inside filing text or earlier model output are
//! never re-expanded.

use std::borrow::Cow;

/// System message sent with every completion.
pub const SYSTEM_PROMPT: &str = "You are a financial expert analyzing SEC filings.";

/// Appended to section text that was cut to fit its budget.
pub const TRUNCATION_MARKER: &str = "[content truncated due to length]";

/// Placeholder summary for the assessment call when the summary failed.
pub const NO_SUMMARY: &str = "No summary available";

/// Prompt for the whole-document summary.
pub const SUMMARY_PROMPT: &str = r#"Summarize the following {filing_type} SEC filing, filed on {filing_date}, concisely.

Cover:
1. The purpose of the filing
2. Key financial figures and disclosures
3. Material events or changes reported
4. Anything an investor should notice immediately

Filing text:
{text}"#;

/// Prompt for one extracted section.
pub const SECTION_PROMPT: &str = r#"You are an expert financial analyst. Analyze the "{section}" section of this {filing_type} SEC filing:

{text}

Provide insights on:
1. Key financial highlights
2. Important disclosures
3. Changes from previous filings
4. Potential red flags or notable items
5. Overall assessment of this section"#;

/// Prompt for the overall assessment, fed with the summary.
pub const ASSESSMENT_PROMPT: &str = r#"Based on this summary of a {filing_type} SEC filing by {company_name} filed on {filing_date}, provide an overall assessment.

Summary:
{summary}

Assess:
1. Overall significance of the filing
2. Likely impact on the company's outlook
3. Key risks and opportunities
4. Items that warrant follow-up"#;

/// Prompt for named-entity extraction.
pub const ENTITY_PROMPT: &str = r#"Extract all important named entities from this SEC filing text:

{text}

For each entity, include:
1. Entity name (company, person, organization)
2. Entity type (company, person, organization, location, etc.)
3. Role in the context (e.g., filer, acquirer, subsidiary, executive, etc.)
4. Brief context about their mention

Format your response as a structured list of entities with their attributes, using "Name:", "Type:" and "Role:" labels.
If no significant entities are found, explicitly state so."#;

/// Prompt for correlating current entities with historical filings.
pub const LINK_PROMPT: &str = r#"Current filing information:
Filing ID: {filing_id}
Date: {filing_date}
Type: {filing_type}
Company: {company_name} (CIK: {cik})

Current filing entities:
{entities}

Historical filing information:
{history}

Task: Identify meaningful connections between entities in the current filing and historical filings.
For each connection, specify:
1. The entities involved (label each one, e.g. "Person: ..." or "Company: ...")
2. The nature of the relationship ("Relationship: ...")
3. Any notable changes or developments
4. Potential significance of the connection

Format your response as a list of connections with detailed explanations.
If no meaningful connections are found, explicitly state so."#;

/// Prompt for event detection.
pub const EVENT_PROMPT: &str = r#"Analyze this {filing_type} SEC filing to identify significant events:

{text}
{analysis_context}
Filing Type: {filing_type} (typically contains {expected_events})

Possible event categories: {categories}

For each significant event detected:
1. Event category (from the list above)
2. Brief description of the event
3. Entities involved
4. Financial impact assessment (None, Low, Medium, High, Unknown)
5. Market impact potential (None, Low, Medium, High, Unknown)
6. Risk level (Low, Medium, High, Critical)

Format your response as a structured list of events with their attributes.
If no significant events are detected, explicitly state so."#;

/// Fill `{name}` placeholders from `vars` in one pass.
///
/// Unknown placeholders and stray braces are copied through unchanged.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render `template` within `max_chars` characters.
///
/// When the filled template is too long, the longest value is shortened
/// first so the fixed instructions around it survive. The result is cut
/// at `max_chars` only if that is not enough.
pub fn render_within(template: &str, vars: &[(&str, &str)], max_chars: usize) -> String {
    let rendered = render(template, vars);
    let overflow = rendered.chars().count().saturating_sub(max_chars);
    if overflow == 0 {
        return rendered;
    }

    let Some(longest) = vars
        .iter()
        .enumerate()
        .max_by_key(|(_, (_, value))| value.chars().count())
        .map(|(i, _)| i)
    else {
        return truncate_chars(&rendered, max_chars).to_string();
    };
    let keep = vars[longest].1.chars().count().saturating_sub(overflow);
    let shortened: Vec<(&str, &str)> = vars
        .iter()
        .enumerate()
        .map(|(i, &(name, value))| {
            if i == longest {
                (name, truncate_chars(value, keep))
            } else {
                (name, value)
            }
        })
        .collect();

    truncate_chars(&render(template, &shortened), max_chars).to_string()
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cut `text` to `max_chars` characters, appending [`TRUNCATION_MARKER`]
/// when anything was removed.
pub fn truncate_with_marker(text: &str, max_chars: usize) -> Cow<'_, str> {
    let kept = truncate_chars(text, max_chars);
    if kept.len() == text.len() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{}\n\n{}", kept, TRUNCATION_MARKER))
    }
}
