// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Prompt construction for every generation request kind.
//!
//! Temperatures and token budgets are per kind; diagram flavors carry an
//! instruction plus a small example the completion should imitate.

use crate::model::FlowchartKind;

/// A fully built prompt: system + user message and sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptParts {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

struct FlowchartTemplate {
    instruction: &'static str,
    example: &'static str,
}

const PROCESS_TEMPLATE: FlowchartTemplate = FlowchartTemplate {
    instruction: "Create a standard process flow diagram",
    example: "graph TD\n    A([Start]) --> B[First Step]\n    B --> C[Second Step]\n    C --> D([End])",
};

const USER_JOURNEY_TEMPLATE: FlowchartTemplate = FlowchartTemplate {
    instruction: "Create a user journey map with touchpoints and experiences",
    example: "graph LR\n    A([User Entry]) --> B[Landing Page]\n    B --> C{Sign Up?}\n    C -->|Yes| D[Registration]\n    C -->|No| E[Browse as Guest]",
};

const SYSTEM_FLOW_TEMPLATE: FlowchartTemplate = FlowchartTemplate {
    instruction: "Design a technical system architecture showing components and data flow",
    example: "graph TD\n    A[Database] --> B[API Server]\n    B --> C{Load Balancer}\n    C --> D[Web Server 1]\n    C --> E[Web Server 2]",
};

fn template(kind: FlowchartKind) -> &'static FlowchartTemplate {
    match kind {
        FlowchartKind::Process => &PROCESS_TEMPLATE,
        FlowchartKind::UserJourney => &USER_JOURNEY_TEMPLATE,
        FlowchartKind::SystemFlow => &SYSTEM_FLOW_TEMPLATE,
    }
}

/// Initial generation from a free-text description.
pub fn generate_prompt(kind: FlowchartKind, prompt: &str) -> PromptParts {
    let template = template(kind);
    let kind_name = kind.as_str();
    PromptParts {
        system: format!(
            "You are an expert flowchart designer specializing in {kind_name} diagrams.\n\
             {instruction}\n\n\
             Rules:\n\
             1. Use the appropriate style for {kind_name} diagrams\n\
             2. Follow the structure shown in this example:\n{example}\n\
             3. Maintain proper node hierarchy and connection flow\n\
             4. Use descriptive but concise node text\n\
             5. Include proper symbols for different node types\n\
             6. Use proper Mermaid.js syntax\n\
             7. Output only valid Mermaid.js code, without code fences or commentary\n\
             8. Ensure all connections use proper arrow syntax (-->)\n\
             9. Use meaningful node IDs that describe their purpose",
            instruction = template.instruction,
            example = template.example,
        ),
        user: format!("Create a {kind_name} diagram for: {prompt}"),
        temperature: 0.7,
        max_tokens: 1500,
    }
}

/// Brainstorming chat about the current flowchart; never emits markup.
pub fn chat_prompt(current_flowchart: &str, prompt: &str) -> PromptParts {
    PromptParts {
        system: "You are a helpful flowchart design assistant who helps brainstorm improvements \
                 and ideas for flowcharts.\n\
                 When analyzing flowcharts, focus on:\n\
                 - Process efficiency and optimization\n\
                 - Potential missing steps or edge cases\n\
                 - Error handling and fallback scenarios\n\
                 - User experience and clarity\n\
                 - Best practices for the specific type of flowchart\n\n\
                 Keep responses friendly, clear, and actionable. If the user asks about making \
                 specific changes, explain the concept but don't try to modify the Mermaid code \
                 directly."
            .to_owned(),
        user: format!(
            "The current flowchart is:\n{current_flowchart}\n\nUser's question/request: {prompt}"
        ),
        temperature: 0.7,
        max_tokens: 1000,
    }
}

/// Textual explanation of the current flowchart in the STEPS / KEY POINTS
/// shape the reply splitter expects.
pub fn summary_prompt(current_flowchart: &str) -> PromptParts {
    PromptParts {
        system: "Analyze the provided Mermaid.js flowchart code and provide:\n\
                 1. A clear step-by-step explanation of what happens in the process\n\
                 2. 3-4 key insights or important points about this process\n\n\
                 Format your response exactly as:\n\
                 STEPS:\n\
                 1. First step explanation\n\
                 2. Second step explanation\n\
                 etc.\n\n\
                 KEY POINTS:\n\
                 \u{2022} First key insight\n\
                 \u{2022} Second key insight\n\
                 etc."
            .to_owned(),
        user: current_flowchart.to_owned(),
        temperature: 0.5,
        max_tokens: 1000,
    }
}

/// Convert the current flowchart into readable pseudocode.
pub fn pseudocode_prompt(current_flowchart: &str) -> PromptParts {
    PromptParts {
        system: "Convert the given Mermaid.js flowchart into clear, readable pseudocode \
                 following these rules:\n\
                 1. Use proper indentation for nested blocks\n\
                 2. Use standard control flow statements (IF, WHILE, FOR, etc.)\n\
                 3. Keep variable names meaningful\n\
                 4. Include comments for clarity\n\
                 5. Make it easy to understand for non-programmers\n\
                 6. Preserve the flowchart's logic exactly\n\
                 7. Use clear BEGIN and END markers\n\
                 8. Add helpful comments explaining key decision points\n\
                 9. Use consistent formatting throughout"
            .to_owned(),
        user: format!("Convert this flowchart to pseudocode:\n{current_flowchart}"),
        temperature: 0.5,
        max_tokens: 1000,
    }
}

/// Apply one requested change to the current flowchart; the completion
/// re-emits the whole diagram.
pub fn modification_prompt(current_flowchart: &str, request: &str) -> PromptParts {
    PromptParts {
        system: "You modify an existing Mermaid.js flowchart according to a single requested \
                 change.\n\
                 Rules:\n\
                 1. Apply only the requested change; keep every other node, connection, and \
                 style exactly as it is\n\
                 2. Keep all existing node IDs stable\n\
                 3. Output the complete updated flowchart\n\
                 4. Output only valid Mermaid.js code, without code fences or commentary"
            .to_owned(),
        user: format!(
            "The current flowchart is:\n{current_flowchart}\n\nRequested change: {request}"
        ),
        temperature: 0.7,
        max_tokens: 1500,
    }
}

/// Free-form natural-language editing; the completion may restructure the
/// diagram but must re-emit it whole.
pub fn edit_prompt(current_flowchart: &str, request: &str) -> PromptParts {
    PromptParts {
        system: "You are an expert flowchart editor. Rework the given Mermaid.js flowchart \
                 according to the user's instructions.\n\
                 Rules:\n\
                 1. Preserve the intent of the original process unless asked otherwise\n\
                 2. Reuse existing node IDs where the nodes survive the edit\n\
                 3. Output the complete resulting flowchart\n\
                 4. Output only valid Mermaid.js code, without code fences or commentary"
            .to_owned(),
        user: format!(
            "The current flowchart is:\n{current_flowchart}\n\nEdit instructions: {request}"
        ),
        temperature: 0.7,
        max_tokens: 1500,
    }
}
