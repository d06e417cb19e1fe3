// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Remote generation client: prompts, completion API access, reply shaping.

pub mod client;
pub mod prompts;
pub mod reply;

pub use client::{CompletionClient, LlmConfig, LlmError, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use prompts::{
    chat_prompt, edit_prompt, generate_prompt, modification_prompt, pseudocode_prompt,
    summary_prompt, PromptParts,
};
pub use reply::{split_summary, strip_code_fences, SummaryReply};
