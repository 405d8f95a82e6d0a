//! Parsing of GitHub issue-form bodies.
//!
//! Issue forms render each question as a `### Heading` followed by a blank
//! line and the user's answer. This crate extracts the handful of answers the
//! triage automation cares about into a typed record, so the labeling logic
//! never has to look at the raw Markdown.
//!
//! Parsing is total: a body that does not follow the template (or is not an
//! issue-form body at all) produces an empty [`IssueForm`], never an error.

use std::sync::LazyLock;

use regex::Regex;

/// The placeholder the issue-form renderer inserts for a skipped question.
const NO_RESPONSE: &str = "_No response_";

static SEVERITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"### Severity\n\n(?P<severity>.*)\n\n### Available workarounds\?\n\n(?P<workaround>.*)\n",
    )
    .unwrap()
});

static COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"### Impacted component\n\n(?P<components>.*)\n\n").unwrap());

/// A single answer to an issue-form question.
///
/// "Field absent" is a first-class result: a question that was skipped, left
/// empty, or answered with the form's `_No response_` placeholder is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    None,
    Text(String),
}

impl Answer {
    fn parse(raw: &str) -> Answer {
        let raw = raw.trim();
        if raw.is_empty() || raw == NO_RESPONSE {
            Answer::None
        } else {
            Answer::Text(raw.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::None => None,
            Answer::Text(text) => Some(text),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Answer::None)
    }
}

/// One `Severity` / `Available workarounds?` question pair.
///
/// Templates normally contain exactly one, but the scan is repeatable and
/// every matched pair becomes its own block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeverityBlock {
    pub severity: Answer,
    pub workaround: Answer,
}

/// The structured contents of an issue body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssueForm {
    pub severity_blocks: Vec<SeverityBlock>,
    /// Comma-separated answers to the `Impacted component` question, split
    /// into individual names. Empty when the section is missing.
    pub components: Vec<String>,
}

impl IssueForm {
    pub fn parse(body: &str) -> IssueForm {
        // Webhook payloads carry CRLF line endings; the template matching
        // below assumes plain newlines.
        let body = body.replace('\r', "");

        let severity_blocks = SEVERITY_RE
            .captures_iter(&body)
            .map(|caps| SeverityBlock {
                severity: Answer::parse(&caps["severity"]),
                workaround: Answer::parse(&caps["workaround"]),
            })
            .collect();

        let components = COMPONENT_RE
            .captures(&body)
            .map(|caps| {
                caps["components"]
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        IssueForm {
            severity_blocks,
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_template() {
        let body = "### Impacted component\n\nSearch, Sync\n\n\
                    ### Severity\n\nAll\n\n\
                    ### Available workarounds?\n\nNo but the platform is still usable\n\n\
                    ### Extra details\n\nnone\n";
        let form = IssueForm::parse(body);
        assert_eq!(form.components, vec!["Search", "Sync"]);
        assert_eq!(
            form.severity_blocks,
            vec![SeverityBlock {
                severity: Answer::Text("All".into()),
                workaround: Answer::Text("No but the platform is still usable".into()),
            }]
        );
    }

    #[test]
    fn crlf_line_endings() {
        let body = "### Severity\r\n\r\nOne\r\n\r\n### Available workarounds?\r\n\r\nYes\r\n";
        let form = IssueForm::parse(body);
        assert_eq!(form.severity_blocks.len(), 1);
        assert_eq!(form.severity_blocks[0].severity, Answer::Text("One".into()));
    }

    #[test]
    fn not_a_form() {
        let form = IssueForm::parse("just some free-form report, no template");
        assert_eq!(form, IssueForm::default());
    }

    #[test]
    fn placeholder_answers_are_absent() {
        let body = "### Severity\n\n_No response_\n\n### Available workarounds?\n\n\n";
        let form = IssueForm::parse(body);
        assert_eq!(form.severity_blocks.len(), 1);
        assert!(form.severity_blocks[0].severity.is_none());
        assert!(form.severity_blocks[0].workaround.is_none());
    }

    #[test]
    fn repeated_blocks_each_match() {
        let body = "### Severity\n\nOne\n\n### Available workarounds?\n\nYes\n\n\
                    ### Severity\n\nAll\n\n### Available workarounds?\n\nNo and the platform is unusable\n\n";
        let form = IssueForm::parse(body);
        assert_eq!(form.severity_blocks.len(), 2);
        assert_eq!(form.severity_blocks[0].severity, Answer::Text("One".into()));
        assert_eq!(form.severity_blocks[1].severity, Answer::Text("All".into()));
    }

    #[test]
    fn components_trim_and_drop_empties() {
        let body = "### Impacted component\n\nSearch,  , Sync , \n\n";
        let form = IssueForm::parse(body);
        assert_eq!(form.components, vec!["Search", "Sync"]);
    }

    #[test]
    fn missing_component_section() {
        let form = IssueForm::parse("### Severity\n\nOne\n\n### Available workarounds?\n\nYes\n");
        assert!(form.components.is_empty());
    }
}
