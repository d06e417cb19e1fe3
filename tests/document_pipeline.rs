// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end document pipeline: accept generated markup, edit it through
//! typed ops, and export it for rendering, the way the server drives it.

use flowgpt::format::mermaid::{export_flowchart, parse_flowchart, validate_generated};
use flowgpt::llm::strip_code_fences;
use flowgpt::model::{Flowchart, NodeShape};
use flowgpt::ops::{apply_ops, NodePatch, Op};
use flowgpt::render::{layout_flowchart, rasterize_png, render_svg, DEFAULT_RASTER_SCALE};

const GENERATED_REPLY: &str = "```mermaid\n\
graph TD\n\
    start([User submits order]) --> validate[Validate cart]\n\
    validate --> payment{Payment ok?}\n\
    payment -->|Yes| fulfill[Fulfill order]\n\
    payment -->|No| notify[Notify user]\n\
```";

#[test]
fn generated_reply_flows_through_edit_and_export() {
    // Accept the completion output the way the generation endpoint does.
    let markup = strip_code_fences(GENERATED_REPLY);
    let doc = validate_generated(&markup).expect("generated markup validates");
    let mut flowchart = Flowchart::new("Order flow", doc);

    assert_eq!(flowchart.doc().nodes().len(), 5);
    assert_eq!(flowchart.doc().connections().len(), 4);

    // A round of typed edits at the stored revision.
    let ops = [
        Op::UpdateNode {
            node_id: "notify".to_owned(),
            patch: NodePatch {
                label: Some("Ask for another card".to_owned()),
                shape: Some(NodeShape::Parallelogram),
            },
        },
        Op::AddNode {
            node_id: "refund".to_owned(),
            label: "Refund".to_owned(),
            shape: NodeShape::Rectangle,
        },
        Op::SetStyle {
            node_id: "payment".to_owned(),
            style: "fill:#ffcc00".to_owned(),
        },
    ];
    let result = apply_ops(&mut flowchart, 0, &ops).expect("ops apply");
    assert_eq!(result.new_rev, 1);
    assert_eq!(result.applied, 3);

    // The edited document round-trips through its textual form.
    let exported = export_flowchart(flowchart.doc()).expect("export");
    assert!(exported.contains("notify[/Ask for another card/]"));
    assert!(exported.contains("style payment fill:#ffcc00"));
    let reparsed = parse_flowchart(&exported).expect("reparse");
    assert_eq!(reparsed.nodes().len(), 6);

    // And it still renders to both export formats.
    let layout = layout_flowchart(flowchart.doc()).expect("layout");
    let svg = render_svg(flowchart.doc(), &layout, "inter");
    assert!(svg.contains(">Ask for another card</text>"));

    let png = rasterize_png(&svg, DEFAULT_RASTER_SCALE).expect("rasterize");
    assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
}

#[test]
fn removing_a_node_detaches_it_everywhere() {
    let markup = strip_code_fences(GENERATED_REPLY);
    let doc = validate_generated(&markup).expect("generated markup validates");
    let mut flowchart = Flowchart::new("Order flow", doc);

    apply_ops(&mut flowchart, 0, &[Op::RemoveNode { node_id: "payment".to_owned() }])
        .expect("remove");

    let exported = export_flowchart(flowchart.doc()).expect("export");
    assert!(!exported.contains("payment"));
    assert!(exported.contains("start(User submits order) --> validate[Validate cart]"));
    assert_eq!(flowchart.doc().connections().len(), 1);
}
