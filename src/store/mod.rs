// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Session persistence in a plain directory.

mod session_folder;

pub use session_folder::{
    SessionFolder, StoreError, WriteDurability, FLOWCHART_FILENAME, SESSION_META_FILENAME,
};
