// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowgpt::format::mermaid::parse_flowchart;
use flowgpt::model::{Flowchart, NodeShape};
use flowgpt::ops::{apply_ops, NodePatch, Op};

mod fixtures;

// Group name in this file: `ops.apply` (case IDs stay stable across refactors).
fn benches_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("ops.apply");

    for case in [
        fixtures::Case::Small,
        fixtures::Case::MediumDense,
        fixtures::Case::LargeLongLabels,
    ] {
        let markup = fixtures::fixture(case);
        let doc = parse_flowchart(&markup).expect("parse_flowchart");

        group.bench_function(case.id(), |b| {
            b.iter(|| {
                let mut flowchart = Flowchart::new("bench", doc.clone());
                let ops = [
                    Op::UpdateNode {
                        node_id: "n1".to_owned(),
                        patch: NodePatch {
                            label: Some("Updated".to_owned()),
                            shape: Some(NodeShape::Diamond),
                        },
                    },
                    Op::SetStyle { node_id: "n2".to_owned(), style: "fill:#0f0".to_owned() },
                    Op::RemoveNode { node_id: "n3".to_owned() },
                ];
                let result = apply_ops(&mut flowchart, 0, &ops).expect("apply_ops");
                black_box(result.new_rev)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benches_ops);
criterion_main!(benches);
