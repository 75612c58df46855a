//! Mermaid flowchart rendering for barrier analysis.
//!
//! Purely local: the diagram is built from the three LLM-produced barrier
//! results without another external call.

use std::collections::HashMap;

use super::types::{AbcClass, AbcClassification, BarrierList, CausalityResult};

/// Longest node label, including the ellipsis.
pub const MAX_LABEL_CHARS: usize = 20;

/// Most causal edges drawn.
pub const MAX_RELATIONS: usize = 30;

const KEY_BARRIER_STYLE: &str = "fill:#ff6b6b,stroke:#c92a2a";

struct Subgraph {
    class: AbcClass,
    id: &'static str,
    title: &'static str,
    style: &'static str,
}

const SUBGRAPHS: [Subgraph; 3] = [
    Subgraph {
        class: AbcClass::A,
        id: "A_SERVICE",
        title: "A: Solved by the service",
        style: "fill:#d4edda,stroke:#28a745",
    },
    Subgraph {
        class: AbcClass::B,
        id: "B_BRAND",
        title: "B: Solved by advertising and branding",
        style: "fill:#fff3cd,stroke:#ffc107",
    },
    Subgraph {
        class: AbcClass::C,
        id: "C_PR",
        title: "C: Solved by PR and social change",
        style: "fill:#cce5ff,stroke:#007bff",
    },
];

/// Render the barrier map as a top-to-bottom Mermaid flowchart.
///
/// Nodes are named `<class><barrier id>` and grouped into one subgraph per
/// class. Key barriers are highlighted and at most [`MAX_RELATIONS`] causal
/// edges are drawn. Barriers missing from the classification are treated as
/// class A.
pub fn render_barrier_diagram(
    barriers: &BarrierList,
    causality: &CausalityResult,
    classification: &AbcClassification,
) -> String {
    let mut class_of: HashMap<i64, AbcClass> = HashMap::new();
    for class in AbcClass::ALL {
        for item in classification.items(class) {
            class_of.insert(item.barrier_id, class);
        }
    }
    let node = |id: i64| -> String {
        let class = class_of.get(&id).copied().unwrap_or(AbcClass::A);
        format!("{}{}", class.as_str(), id)
    };

    let mut lines = vec!["flowchart TB".to_string()];

    for subgraph in &SUBGRAPHS {
        lines.push(format!("    subgraph {}[{}]", subgraph.id, subgraph.title));
        for item in classification.items(subgraph.class) {
            let label = barriers
                .find(item.barrier_id)
                .map(|b| b.barrier.as_str())
                .unwrap_or(item.barrier.as_str());
            lines.push(format!(
                "        {}{}[\"{}\"]",
                subgraph.class.as_str(),
                item.barrier_id,
                truncate_label(label)
            ));
        }
        lines.push("    end".to_string());
    }

    lines.push(String::new());
    lines.push("    %% Key barriers (high connectivity)".to_string());
    for id in &causality.key_barriers {
        lines.push(format!("    style {} {}", node(*id), KEY_BARRIER_STYLE));
    }

    lines.push(String::new());
    lines.push("    %% Causal relationships".to_string());
    for relation in causality.relations.iter().take(MAX_RELATIONS) {
        lines.push(format!(
            "    {} --> {}",
            node(relation.from_id),
            node(relation.to_id)
        ));
    }

    lines.push(String::new());
    lines.push("    %% Styling".to_string());
    for subgraph in &SUBGRAPHS {
        lines.push(format!("    style {} {}", subgraph.id, subgraph.style));
    }

    lines.join("\n")
}

/// Shorten a label to [`MAX_LABEL_CHARS`] characters and neutralise quotes.
pub fn truncate_label(text: &str) -> String {
    let text = text.replace('"', "#quot;");
    if text.chars().count() <= MAX_LABEL_CHARS {
        return text;
    }
    let head: String = text.chars().take(MAX_LABEL_CHARS - 3).collect();
    format!("{}...", head)
}
