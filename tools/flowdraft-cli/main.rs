use clap::{Parser, Subcommand};
use flowdraft::graph::{FieldCatalog, NodeData};
use flowdraft::prelude::*;
use flowdraft::serialization::upgrade_legacy_rule;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Offline tooling for returns workflow graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an exported workflow file for structural problems
    Validate {
        /// Path to the exported workflow JSON file
        path: PathBuf,
    },
    /// Rearrange every node with the layered auto-layout
    Layout {
        path: PathBuf,
        /// Where to write the result (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the viewport that fits every node on a canvas of the given size
    Fit {
        path: PathBuf,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
    },
    /// Convert a persisted workflow rule record into an export file
    Upgrade {
        /// Path to the rule record JSON file
        rule_path: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize the nodes and edges of an exported workflow file
    Describe {
        path: PathBuf,
        /// Optional field catalog used to label condition fields
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { path } => run_validate(&path),
        Command::Layout { path, output } => {
            let graph = auto_layout_graph(&load_graph(&path));
            write_graph(&graph, output.as_ref());
        }
        Command::Fit {
            path,
            width,
            height,
        } => {
            let graph = load_graph(&path);
            let viewport = compute_fit_to_view(&graph.nodes, width, height, None);
            println!(
                "x: {:.1}  y: {:.1}  zoom: {:.3}",
                viewport.x, viewport.y, viewport.zoom
            );
        }
        Command::Upgrade { rule_path, output } => run_upgrade(&rule_path, output.as_ref()),
        Command::Describe { path, catalog } => run_describe(&path, catalog.as_ref()),
    }
}

fn read_file(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read '{}': {}", path.display(), e))
    })
}

fn load_graph(path: &PathBuf) -> WorkflowGraph {
    import_graph(&read_file(path)).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to import '{}': {}", path.display(), e))
    })
}

fn write_graph(graph: &WorkflowGraph, output: Option<&PathBuf>) {
    let json = export_graph(graph)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to export graph: {}", e)));
    match output {
        Some(path) => {
            fs::write(path, json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
            });
            println!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
}

fn run_validate(path: &PathBuf) {
    let graph = load_graph(path);
    let errors = validate_workflow(&graph);
    if errors.is_empty() {
        println!(
            "OK: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        return;
    }
    println!("{} problem(s) found:", errors.len());
    for error in &errors {
        match &error.node_id {
            Some(node_id) => println!("  -> [{}] {}", node_id, error.message),
            None => println!("  -> {}", error.message),
        }
    }
    std::process::exit(2);
}

fn run_upgrade(rule_path: &PathBuf, output: Option<&PathBuf>) {
    let json = read_file(rule_path);
    let graph = match serde_json::from_str::<WorkflowRule>(&json) {
        Ok(rule) => {
            let rule_id = rule.id.clone();
            rule.into_workflow_graph().unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to convert rule '{}': {}", rule_id, e))
            })
        }
        Err(e) => {
            // Bare legacy exports only carry the three rule fields.
            let raw: serde_json::Value = serde_json::from_str(&json).unwrap_or_else(|_| {
                exit_with_error(&format!("Failed to parse rule record: {}", e))
            });
            let trigger_type = raw
                .get("triggerType")
                .or_else(|| raw.get("trigger_type"))
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            upgrade_legacy_rule(
                trigger_type,
                raw.get("conditions").unwrap_or(&serde_json::Value::Null),
                raw.get("actions").unwrap_or(&serde_json::Value::Null),
            )
        }
    };
    write_graph(&graph, output);
}

fn run_describe(path: &PathBuf, catalog_path: Option<&PathBuf>) {
    let graph = load_graph(path);
    let catalog = match catalog_path {
        Some(catalog_path) => FieldCatalog::from_json(&read_file(catalog_path))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse field catalog: {}", e))),
        None => FieldCatalog::default(),
    };

    println!("--- Nodes ({}) ---", graph.nodes.len());
    for node in &graph.nodes {
        println!(
            "{:<10} {:<10} {:<28} ({:.0}, {:.0})",
            node.id,
            node.node_type(),
            node.label,
            node.position.x,
            node.position.y
        );
        match &node.data {
            NodeData::Trigger(trigger) => println!("    on {}", trigger.event_type),
            NodeData::Condition(condition) => {
                for field_condition in &condition.conditions {
                    println!(
                        "    {} {}",
                        condition.logic_operator.as_str(),
                        field_condition.describe(&catalog)
                    );
                }
            }
            NodeData::Action(action) => println!(
                "    do {} [{}]",
                action.action_type,
                action.action_type.family()
            ),
            NodeData::Delay(delay) => println!("    wait {:?}", delay.to_duration()),
        }
    }

    println!("\n--- Edges ({}) ---", graph.edges.len());
    for edge in &graph.edges {
        match edge.source_handle {
            Some(handle) => println!("{} -[{}]-> {}", edge.source, handle, edge.target),
            None => println!("{} -> {}", edge.source, edge.target),
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
