use anyhow::{Result, bail};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::models::{Command, CommandGroup, CommandVariant};

/// A command as drawn in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    pub id: String,
    pub kind: &'static str,
    pub group: Option<CommandGroup>,
}

/// Composite commands and the sub-commands they run.
///
/// Edges point from a sub-command to the composite that runs it, so a
/// topological order runs sub-commands first.
pub struct CommandGraph {
    graph: DiGraph<CommandNode, ()>,
}

impl CommandGraph {
    pub fn new(commands: &[Command]) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        for command in commands {
            let node = graph.add_node(CommandNode {
                id: command.id.clone(),
                kind: command_kind(command),
                group: command.group().cloned(),
            });
            node_map.insert(command.id.to_lowercase(), node);
        }

        for command in commands {
            let Ok(Some(CommandVariant::Composite(composite))) = command.variant() else {
                continue;
            };
            let composite_node = node_map[&command.id.to_lowercase()];

            for sub_id in &composite.commands {
                let Some(&sub_node) = node_map.get(&sub_id.to_lowercase()) else {
                    bail!(
                        "Composite command '{}' runs '{}', but that command doesn't exist",
                        command.id,
                        sub_id
                    );
                };
                graph.add_edge(sub_node, composite_node, ());
            }
        }

        let command_graph = Self { graph };
        if command_graph.has_cycles() {
            bail!("Circular references detected between composite commands");
        }

        Ok(command_graph)
    }

    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Command ids in an order where every sub-command precedes its composites
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(nodes) => Ok(nodes
                .into_iter()
                .map(|node| self.graph[node].id.clone())
                .collect()),
            Err(_) => bail!("Cannot perform topological sort: graph contains cycles"),
        }
    }

    /// Render as Graphviz DOT, clustering commands by group kind
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph Commands {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=rounded, fontname=\"Arial\"];\n");
        output.push('\n');

        let mut clusters: Vec<(String, Vec<&CommandNode>)> = Vec::new();
        for node in self.graph.node_weights() {
            let cluster = node
                .group
                .as_ref()
                .map(|group| group.kind.to_string())
                .unwrap_or_default();
            match clusters.iter_mut().find(|(name, _)| *name == cluster) {
                Some((_, nodes)) => nodes.push(node),
                None => clusters.push((cluster, vec![node])),
            }
        }

        for (cluster, nodes) in &clusters {
            let indent = if cluster.is_empty() {
                "  "
            } else {
                output.push_str(&format!("  subgraph cluster_{cluster} {{\n"));
                output.push_str(&format!("    label=\"{cluster}\";\n"));
                "    "
            };

            for node in nodes {
                let marker = match &node.group {
                    Some(group) if group.is_default => " (default)",
                    _ => "",
                };
                output.push_str(&format!(
                    "{indent}\"{}\" [label=\"{}\\n{}{}\"];\n",
                    node.id, node.id, node.kind, marker
                ));
            }

            if !cluster.is_empty() {
                output.push_str("  }\n");
            }
        }

        if self.graph.edge_count() > 0 {
            output.push('\n');
        }
        for edge in self.graph.edge_references() {
            let source = &self.graph[edge.source()].id;
            let target = &self.graph[edge.target()].id;
            output.push_str(&format!("  \"{source}\" -> \"{target}\";\n"));
        }

        output.push_str("}\n");
        output
    }
}

fn command_kind(command: &Command) -> &'static str {
    match command.variant() {
        Ok(Some(CommandVariant::Exec(_))) => "exec",
        Ok(Some(CommandVariant::Apply(_))) => "apply",
        Ok(Some(CommandVariant::Composite(_))) => "composite",
        Ok(Some(CommandVariant::Custom(_))) => "custom",
        Ok(None) | Err(_) => "unknown",
    }
}
