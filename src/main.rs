use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use graphlens::client::{GraphClient, NodeListOptions};
use graphlens::crud::CrudOrchestrator;
use graphlens::model::NodeLabel;
use graphlens::session::{
    FileSessionStore, ReplayCallbacks, ReplayEngine, SessionRecorder, SessionStorage,
};
use graphlens::Config;
use std::sync::Arc;

/// Explore a remote property graph from the terminal, with a persisted
/// session that `replay` reconstructs after a restart.
#[derive(Parser)]
#[command(name = "graphlens", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the graph-wide overview (domains and stats)
    Overview,
    /// List nodes of a label
    Nodes {
        #[arg(value_parser = parse_label)]
        label: NodeLabel,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Lexical search over the graph
    Search {
        query: String,
        #[arg(long, value_parser = parse_label)]
        label: Option<NodeLabel>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Embedding-based semantic search over the graph
    Semantic {
        query: String,
        #[arg(long, value_parser = parse_label)]
        label: Option<NodeLabel>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Center a node and show its one-hop neighborhood
    Explore { uuid: String },
    /// Show the ancestry paths leading to a node
    Lineage { uuid: String },
    /// Pin an explicit working set of nodes (replaces the previous set)
    Pin { uuids: Vec<String> },
    /// Unpin all nodes
    Unpin,
    /// Rebuild the view recorded in the persisted session
    Replay,
    /// Drop the persisted session
    ClearSession,
}

fn parse_label(s: &str) -> std::result::Result<NodeLabel, String> {
    NodeLabel::parse(s).ok_or_else(|| {
        let known: Vec<&str> = NodeLabel::ALL.iter().map(|l| l.as_str()).collect();
        format!("unknown label '{}' (expected one of: {})", s, known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "info"),
    )
    .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let client = GraphClient::new(&config.server.base_url, config.server.timeout_secs)?;
    let orchestrator = Arc::new(CrudOrchestrator::new(client));
    let store: Arc<dyn SessionStorage> = Arc::new(FileSessionStore::new(&config.session.path));
    let mut recorder = SessionRecorder::new(store.clone());

    match cli.command {
        Command::Overview => {
            let overview = orchestrator.client().fetch_graph_overview().await?;
            println!("Domains ({}):", overview.domains.len());
            for domain in &overview.domains {
                println!("  {}", domain);
            }
            println!("Stats:");
            for (key, value) in &overview.stats {
                println!("  {}: {}", key, value);
            }
        }
        Command::Nodes { label, offset, limit, search } => {
            let options = NodeListOptions { offset, limit, search };
            match orchestrator.load_nodes_list(label, &options).await {
                Some(page) => {
                    recorder.record_entity_select(label);
                    println!(
                        "{} nodes (showing {} from offset {}):",
                        page.total,
                        page.nodes.len(),
                        page.offset
                    );
                    for node in &page.nodes {
                        print_node(node);
                    }
                }
                None => bail_with_status(&orchestrator)?,
            }
        }
        Command::Search { query, label, limit } => {
            let hits = orchestrator.client().search_graph(&query, label, limit).await?;
            recorder.record_search(&query, label);
            println!("{} matches:", hits.total);
            for node in &hits.nodes {
                print_node(node);
            }
        }
        Command::Semantic { query, label, limit } => {
            let hits = orchestrator
                .client()
                .semantic_search_graph(&query, label, limit)
                .await?;
            recorder.record_semantic_search(&query, label);
            println!("{} matches:", hits.total);
            for node in &hits.nodes {
                print_node(node);
            }
        }
        Command::Explore { uuid } => {
            let explored = orchestrator.client().fetch_explore_node(&uuid).await?;
            recorder.record_explore(&uuid);
            println!("Center:");
            print_node(&explored.center);
            println!("Neighbors ({}):", explored.neighbors.len());
            for node in &explored.neighbors {
                print_node(node);
            }
            for edge in &explored.edges {
                println!(
                    "  {} --{}--> {}",
                    edge.source_node.name, edge.edge_type, edge.target_node.name
                );
            }
        }
        Command::Lineage { uuid } => {
            let lineage = orchestrator.client().fetch_lineage(&uuid).await?;
            recorder.record_lineage(&uuid);
            println!("Paths ({}):", lineage.paths.len());
            for path in &lineage.paths {
                println!("  {}", path.join(" -> "));
            }
        }
        Command::Pin { uuids } => {
            if uuids.is_empty() {
                anyhow::bail!("pin requires at least one uuid");
            }
            recorder.record_pinned_nodes(uuids.clone());
            println!("Pinned {} nodes", uuids.len());
        }
        Command::Unpin => {
            recorder.clear_pinned_nodes();
            println!("Pinned set cleared");
        }
        Command::Replay => {
            let mut engine = ReplayEngine::new(store);
            let mut callbacks = CliCallbacks { orchestrator: orchestrator.clone() };
            if engine.run(&mut callbacks).await {
                println!("Session replayed");
            } else {
                println!("No session to replay");
            }
        }
        Command::ClearSession => {
            recorder.clear();
            println!("Session cleared");
        }
    }

    Ok(())
}

fn print_node(node: &graphlens::GraphNode) {
    if node.summary.is_empty() {
        println!("  [{}] {} ({})", node.label, node.name, node.uuid);
    } else {
        println!("  [{}] {} ({}) - {}", node.label, node.name, node.uuid, node.summary);
    }
}

fn bail_with_status(orchestrator: &CrudOrchestrator) -> Result<()> {
    match orchestrator.last_error() {
        Some(message) => anyhow::bail!(message),
        None => Ok(()),
    }
}

/// Replays the persisted session against the live backend, printing what
/// the canvas would render.
struct CliCallbacks {
    orchestrator: Arc<CrudOrchestrator>,
}

#[async_trait]
impl ReplayCallbacks for CliCallbacks {
    async fn set_selected_entity_type(&mut self, label: NodeLabel) {
        println!("Selected entity type: {}", label);
    }

    async fn set_pinned_nodes(&mut self, uuids: &[String]) {
        println!("Pinned nodes: {}", uuids.join(", "));
    }

    async fn load_entity_nodes(&mut self, label: NodeLabel) {
        match self
            .orchestrator
            .load_nodes_list(label, &NodeListOptions::default())
            .await
        {
            Some(page) => {
                println!("{} {} nodes:", page.total, label);
                for node in &page.nodes {
                    print_node(node);
                }
            }
            None => print_error(&self.orchestrator),
        }
    }

    async fn search_nodes(&mut self, query: &str, label: Option<NodeLabel>) {
        match self.orchestrator.client().search_graph(query, label, None).await {
            Ok(hits) => {
                println!("Search '{}': {} matches", query, hits.total);
                for node in &hits.nodes {
                    print_node(node);
                }
            }
            Err(e) => println!("Search failed: {}", e),
        }
    }

    async fn semantic_search(&mut self, query: &str, label: Option<NodeLabel>) {
        match self
            .orchestrator
            .client()
            .semantic_search_graph(query, label, None)
            .await
        {
            Ok(hits) => {
                println!("Semantic search '{}': {} matches", query, hits.total);
                for node in &hits.nodes {
                    print_node(node);
                }
            }
            Err(e) => println!("Semantic search failed: {}", e),
        }
    }

    async fn explore_node(&mut self, uuid: &str) {
        match self.orchestrator.client().fetch_explore_node(uuid).await {
            Ok(explored) => {
                println!(
                    "Explored {} ({} neighbors)",
                    explored.center.name,
                    explored.neighbors.len()
                );
            }
            Err(e) => println!("Explore {} failed: {}", uuid, e),
        }
    }

    async fn load_lineage(&mut self, uuid: &str) {
        match self.orchestrator.client().fetch_lineage(uuid).await {
            Ok(lineage) => {
                println!("Lineage of {} ({} paths):", uuid, lineage.paths.len());
                for path in &lineage.paths {
                    println!("  {}", path.join(" -> "));
                }
            }
            Err(e) => println!("Lineage {} failed: {}", uuid, e),
        }
    }
}

fn print_error(orchestrator: &CrudOrchestrator) {
    if let Some(message) = orchestrator.last_error() {
        println!("Error: {}", message);
    }
}
