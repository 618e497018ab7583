//! Geo-tagged need/help reports
//!
//! The globe only ever looks at `id`, `lat`, `lng` and `kind`; everything
//! else is carried for the info panel and the view filter.

use crate::colors::{palette, Rgba};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Built-in sample reports used when no node file is configured
const SAMPLE_NODES: &str = include_str!("../demos/nodes.json");

/// Minimum time between modification-time checks of the node file
const RELOAD_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Need,
    Help,
}

impl NodeKind {
    /// Marker color
    pub fn color(self) -> Rgba {
        match self {
            NodeKind::Need => palette::NEED,
            NodeKind::Help => palette::HELP,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Need => "Need",
            NodeKind::Help => "Help Offered",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Active,
    Matched,
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub lat: f32,
    pub lng: f32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub urgency: u8,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trust_level: u8,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub reported_by: Option<String>,
    #[serde(default)]
    pub verified_by: Vec<String>,
    #[serde(default)]
    pub matched_with: Option<String>,
}

impl Node {
    /// Minimal node with only the fields the globe reads
    #[cfg(test)]
    pub fn new(id: impl Into<String>, kind: NodeKind, lat: f32, lng: f32) -> Self {
        Self {
            id: id.into(),
            kind,
            lat,
            lng,
            category: String::new(),
            description: String::new(),
            urgency: 0,
            timestamp: None,
            trust_level: 0,
            location: String::new(),
            status: NodeStatus::Active,
            reported_by: None,
            verified_by: Vec::new(),
            matched_with: None,
        }
    }

    /// "5m ago" style age relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> Option<String> {
        let secs = (now - self.timestamp?).num_seconds().max(0);
        Some(match secs {
            0..=59 => "just now".to_string(),
            60..=3599 => format!("{}m ago", secs / 60),
            3600..=86399 => format!("{}h ago", secs / 3600),
            _ => format!("{}d ago", secs / 86400),
        })
    }
}

/// Parse a JSON array of nodes
pub fn parse_nodes(json: &str) -> io::Result<Vec<Node>> {
    serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn load_nodes(path: &Path) -> io::Result<Vec<Node>> {
    parse_nodes(&fs::read_to_string(path)?)
}

pub fn sample_nodes() -> Vec<Node> {
    parse_nodes(SAMPLE_NODES).unwrap_or_default()
}

/// View filter applied before nodes reach the globe
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeFilter {
    pub kind: Option<NodeKind>,
    pub category: Option<String>,
    pub min_urgency: Option<u8>,
}

impl NodeFilter {
    pub fn matches(&self, node: &Node) -> bool {
        if node.status == NodeStatus::Resolved {
            return false;
        }
        if self.kind.is_some_and(|k| k != node.kind) {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| c != node.category) {
            return false;
        }
        if self.min_urgency.is_some_and(|u| node.urgency < u) {
            return false;
        }
        true
    }

    pub fn apply(&self, nodes: &[Node]) -> Vec<Node> {
        nodes.iter().filter(|n| self.matches(n)).cloned().collect()
    }

    /// Cycle the kind restriction: all -> need -> help -> all
    pub fn cycle_kind(&mut self) {
        self.kind = match self.kind {
            None => Some(NodeKind::Need),
            Some(NodeKind::Need) => Some(NodeKind::Help),
            Some(NodeKind::Help) => None,
        };
    }
}

/// Where nodes come from: a watched JSON file or the built-in samples
pub struct NodeSource {
    path: Option<PathBuf>,
    modified: Option<SystemTime>,
    last_check: Option<Instant>,
    nodes: Vec<Node>,
}

impl NodeSource {
    pub fn open(path: Option<PathBuf>) -> io::Result<Self> {
        let (nodes, modified) = match &path {
            Some(p) => (load_nodes(p)?, fs::metadata(p).and_then(|m| m.modified()).ok()),
            None => (sample_nodes(), None),
        };
        Ok(Self {
            path,
            modified,
            last_check: None,
            nodes,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Reload if the file changed since the last load. Returns true when the list was replaced.
    pub fn poll_reload(&mut self, now: Instant) -> bool {
        if self.last_check.is_some_and(|t| now.duration_since(t) < RELOAD_CHECK_INTERVAL) {
            return false;
        }
        self.last_check = Some(now);
        let Some(path) = &self.path else {
            return false;
        };
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
        if modified.is_none() || modified == self.modified {
            return false;
        }
        self.modified = modified;
        self.reload()
    }

    /// Re-read the file unconditionally. A failed parse keeps the previous list.
    pub fn reload(&mut self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        match load_nodes(path) {
            Ok(nodes) => {
                tracing::info!(path = %path.display(), count = nodes.len(), "reloaded nodes");
                self.nodes = nodes;
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "node reload failed, keeping previous list");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_camel_case_with_defaults() {
        let nodes = parse_nodes(
            r#"[{"id":"a","type":"need","lat":1.5,"lng":-2.0,"trustLevel":80},
                {"id":"b","type":"help","lat":0,"lng":0,"status":"resolved"}]"#,
        )
        .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].kind, NodeKind::Need);
        assert_eq!(nodes[0].trust_level, 80);
        assert_eq!(nodes[0].status, NodeStatus::Active);
        assert_eq!(nodes[1].status, NodeStatus::Resolved);
    }

    #[test]
    fn bad_json_is_invalid_data() {
        let err = parse_nodes("{not json").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(parse_nodes(r#"[{"id":"a","type":"other","lat":0,"lng":0}]"#).is_err());
    }

    #[test]
    fn sample_set_loads() {
        let nodes = sample_nodes();
        assert!(!nodes.is_empty());
        assert!(nodes.iter().any(|n| n.kind == NodeKind::Help));
    }

    #[test]
    fn kind_colors_differ() {
        assert_ne!(NodeKind::Need.color(), NodeKind::Help.color());
    }

    #[test]
    fn filter_hides_resolved_and_applies_criteria() {
        let mut urgent = Node::new("1", NodeKind::Need, 0.0, 0.0);
        urgent.urgency = 90;
        urgent.category = "Medical".into();
        let mut calm = Node::new("2", NodeKind::Help, 0.0, 0.0);
        calm.urgency = 30;
        let mut done = Node::new("3", NodeKind::Need, 0.0, 0.0);
        done.status = NodeStatus::Resolved;
        let nodes = vec![urgent, calm, done];

        assert_eq!(NodeFilter::default().apply(&nodes).len(), 2);

        let by_urgency = NodeFilter { min_urgency: Some(80), ..Default::default() };
        assert_eq!(by_urgency.apply(&nodes)[0].id, "1");

        let by_category = NodeFilter { category: Some("Food".into()), ..Default::default() };
        assert!(by_category.apply(&nodes).is_empty());
    }

    #[test]
    fn cycle_kind_wraps() {
        let mut f = NodeFilter::default();
        f.cycle_kind();
        assert_eq!(f.kind, Some(NodeKind::Need));
        f.cycle_kind();
        assert_eq!(f.kind, Some(NodeKind::Help));
        f.cycle_kind();
        assert_eq!(f.kind, None);
    }

    #[test]
    fn age_formats_relative_time() {
        let mut node = Node::new("a", NodeKind::Need, 0.0, 0.0);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(node.age(now), None);
        node.timestamp = Some(now - chrono::Duration::minutes(5));
        assert_eq!(node.age(now).as_deref(), Some("5m ago"));
        node.timestamp = Some(now - chrono::Duration::hours(3));
        assert_eq!(node.age(now).as_deref(), Some("3h ago"));
    }

    #[test]
    fn source_without_file_uses_samples() {
        let mut source = NodeSource::open(None).unwrap();
        assert_eq!(source.nodes().len(), sample_nodes().len());
        assert!(!source.poll_reload(Instant::now()));
    }

    #[test]
    fn source_reloads_and_survives_bad_file() {
        let path = std::env::temp_dir().join(format!("civiglobe-nodes-{}.json", std::process::id()));
        fs::write(&path, r#"[{"id":"a","type":"need","lat":0,"lng":0}]"#).unwrap();
        let mut source = NodeSource::open(Some(path.clone())).unwrap();
        assert_eq!(source.nodes().len(), 1);

        fs::write(&path, r#"[{"id":"a","type":"need","lat":0,"lng":0},{"id":"b","type":"help","lat":1,"lng":1}]"#).unwrap();
        assert!(source.reload());
        assert_eq!(source.nodes().len(), 2);

        fs::write(&path, "garbage").unwrap();
        assert!(!source.reload());
        assert_eq!(source.nodes().len(), 2);

        let _ = fs::remove_file(&path);
    }
}
