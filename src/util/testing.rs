//! Test helpers: logging setup and outline fixtures

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::services::OutlineFile;
use crate::domain::{Node, NodeKind, OrderKey};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "kbtree=trace");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Node with a fixed id and the name set to the id.
///
/// Panics on an invalid key; test input only.
pub fn node(id: &str, kind: NodeKind, parent: Option<&str>, key: &str) -> Node {
    let key = OrderKey::parse(key).unwrap_or_else(|e| panic!("fixture key {key:?}: {e}"));
    let mut node = Node::new(kind, id, parent.map(String::from), key)
        .unwrap_or_else(|e| panic!("fixture node {id:?}: {e}"));
    node.id = id.to_string();
    node
}

pub fn folder(id: &str, parent: Option<&str>, key: &str) -> Node {
    node(id, NodeKind::Folder, parent, key)
}

pub fn doc(id: &str, parent: Option<&str>, key: &str) -> Node {
    node(id, NodeKind::Doc, parent, key)
}

/// Serialize `nodes` as an outline file at `dir/outline.toml`.
pub fn write_outline(dir: &Path, nodes: &[Node]) -> PathBuf {
    let path = dir.join("outline.toml");
    let file = OutlineFile {
        nodes: nodes.to_vec(),
    };
    let content = toml::to_string_pretty(&file)
        .unwrap_or_else(|e| panic!("serialize fixture outline: {e}"));
    std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
    path
}
