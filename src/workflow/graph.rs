//! Mermaid rendering of the outfit workflow graph.

use std::fmt::Write as _;
use std::path::Path;

use super::controller::CycleStatus;
use super::generator::BodySlot;

const START: (&str, &str) = ("start", "START");
const END: (&str, &str) = ("finish", "END");
const CYCLE: (&str, &str) = ("cycle", "Start Outfit Cycle");
const VALIDATE: (&str, &str) = ("validate", "Validate Outfit");

/// An edge between two node ids, optionally labelled with a routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: &'static str,
    pub to: &'static str,
    pub label: Option<&'static str>,
}

fn slot_id(slot: BodySlot) -> &'static str {
    match slot {
        BodySlot::Head => "head",
        BodySlot::Torso => "torso",
        BodySlot::Legs => "legs",
    }
}

fn route_label(status: CycleStatus) -> &'static str {
    match status {
        CycleStatus::Running => "retry",
        CycleStatus::Approved => "approve",
        CycleStatus::GivenUp => "give_up",
    }
}

/// Nodes as `(id, label)` pairs.
pub fn nodes() -> Vec<(&'static str, &'static str)> {
    let mut nodes = vec![START, CYCLE];
    nodes.extend(BodySlot::ALL.iter().map(|slot| (slot_id(*slot), slot.node_name())));
    nodes.push(VALIDATE);
    nodes.push(END);
    nodes
}

/// All edges of the workflow, fan-out and conditional routes included.
pub fn edges() -> Vec<Edge> {
    let mut edges = vec![Edge { from: START.0, to: CYCLE.0, label: None }];

    for slot in BodySlot::ALL {
        edges.push(Edge { from: CYCLE.0, to: slot_id(slot), label: None });
    }
    for slot in BodySlot::ALL {
        edges.push(Edge { from: slot_id(slot), to: VALIDATE.0, label: None });
    }

    for status in [CycleStatus::Approved, CycleStatus::Running, CycleStatus::GivenUp] {
        let to = if status.is_terminal() { END.0 } else { CYCLE.0 };
        edges.push(Edge { from: VALIDATE.0, to, label: Some(route_label(status)) });
    }

    edges
}

/// Render the graph as Mermaid flowchart source.
pub fn render_mermaid() -> String {
    let mut out = String::from("graph TD;\n");

    for (id, label) in nodes() {
        let shape = if id == START.0 || id == END.0 {
            format!("([{label}])")
        } else {
            format!("[{label}]")
        };
        let _ = writeln!(out, "    {id}{shape};");
    }

    for edge in edges() {
        match edge.label {
            Some(label) => {
                let _ = writeln!(out, "    {} -. {} .-> {};", edge.from, label, edge.to);
            }
            None => {
                let _ = writeln!(out, "    {} --> {};", edge.from, edge.to);
            }
        }
    }

    out
}

/// Render the graph wrapped in a Markdown code fence.
pub fn render_markdown() -> String {
    format!("```mermaid\n{}```\n", render_mermaid())
}

/// Write the Markdown rendering to `path`.
pub fn write_markdown(path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, render_markdown())
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "Saved Mermaid diagram source");
    Ok(())
}
