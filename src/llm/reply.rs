// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Post-processing of completion replies.

use regex::Regex;

/// Extract diagram markup from a reply that may wrap it in a Markdown code
/// fence (with or without a language tag, with or without surrounding prose).
pub fn strip_code_fences(reply: &str) -> String {
    let trimmed = reply.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed.to_owned();
    };

    let after = &trimmed[start + 3..];
    let first_line_end = after.find('\n').unwrap_or(after.len());
    let first_line = after[..first_line_end].trim();

    // A bare fence may put the header on the fence line itself; anything that
    // looks like markup is content, not a language tag.
    let body = if first_line.starts_with("graph") || first_line.starts_with("flowchart") {
        after
    } else if first_line_end < after.len() {
        &after[first_line_end + 1..]
    } else {
        return trimmed.to_owned();
    };

    let end = body.find("```").unwrap_or(body.len());
    body[..end].trim().to_owned()
}

/// A summary reply split into its structured fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReply {
    pub summary: String,
    pub key_points: Vec<String>,
}

/// Split a `STEPS:` / `KEY POINTS:` formatted reply into structured fields.
///
/// Replies that do not follow the requested shape fall back to the whole text
/// as the summary with no key points.
pub fn split_summary(reply: &str) -> SummaryReply {
    let steps_pattern = Regex::new(r"(?s)STEPS:\s*(.*?)\s*KEY POINTS:").expect("valid steps pattern");
    let points_pattern = Regex::new(r"(?s)KEY POINTS:\s*(.*)\s*$").expect("valid key points pattern");

    let summary = steps_pattern
        .captures(reply)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_owned());
    let key_points = points_pattern
        .captures(reply)
        .and_then(|captures| captures.get(1))
        .map(|m| {
            m.as_str()
                .lines()
                .map(|line| {
                    line.trim_start_matches(|ch: char| {
                        ch == '\u{2022}' || ch == '-' || ch == '*' || ch.is_whitespace()
                    })
                    .trim()
                    .to_owned()
                })
                .filter(|point| !point.is_empty())
                .collect::<Vec<_>>()
        });

    match (summary, key_points) {
        (Some(summary), Some(key_points)) if !summary.is_empty() => {
            SummaryReply { summary, key_points }
        }
        _ => SummaryReply { summary: reply.trim().to_owned(), key_points: Vec::new() },
    }
}

#[cfg(test)]
mod tests {
    use super::{split_summary, strip_code_fences};

    #[test]
    fn strips_mermaid_fences() {
        let reply = "```mermaid\ngraph TD\n    A --> B\n```";
        assert_eq!(strip_code_fences(reply), "graph TD\n    A --> B");
    }

    #[test]
    fn strips_bare_fences_and_surrounding_prose() {
        let reply = "Here is your flowchart:\n```\ngraph TD\n    A --> B\n```\nLet me know!";
        assert_eq!(strip_code_fences(reply), "graph TD\n    A --> B");
    }

    #[test]
    fn keeps_unfenced_replies_as_is() {
        let reply = "graph TD\n    A --> B";
        assert_eq!(strip_code_fences(reply), reply);
    }

    #[test]
    fn keeps_markup_when_fence_line_carries_the_header() {
        let reply = "```graph TD\n    A --> B\n```";
        assert_eq!(strip_code_fences(reply), "graph TD\n    A --> B");
    }

    #[test]
    fn splits_well_formed_summaries() {
        let reply = "STEPS:\n1. The user signs in\n2. The order is validated\n\nKEY POINTS:\n\u{2022} Sign-in gates everything\n\u{2022} Validation happens early\n";
        let parsed = split_summary(reply);

        assert_eq!(parsed.summary, "1. The user signs in\n2. The order is validated");
        assert_eq!(
            parsed.key_points,
            vec![
                "Sign-in gates everything".to_owned(),
                "Validation happens early".to_owned()
            ]
        );
    }

    #[test]
    fn accepts_dash_bullets() {
        let reply = "STEPS:\n1. One\n\nKEY POINTS:\n- first\n- second";
        let parsed = split_summary(reply);
        assert_eq!(parsed.key_points, vec!["first".to_owned(), "second".to_owned()]);
    }

    #[test]
    fn falls_back_to_raw_text_for_unstructured_replies() {
        let reply = "This flowchart describes a checkout process.";
        let parsed = split_summary(reply);
        assert_eq!(parsed.summary, reply);
        assert!(parsed.key_points.is_empty());
    }
}
