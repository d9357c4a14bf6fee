use serde::{Deserialize, Serialize};

/// Id of the column seeded with the starting topic
pub const ROOT_COLUMN_ID: &str = "root";

/// Description given to the starting topic node
pub const ROOT_NODE_DESC: &str = "The starting point of your journey.";

/// Separator used to join the selected path into a request context
pub const CONTEXT_SEPARATOR: &str = "/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Concept,
    Entity,
    Process,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub status: NodeStatus,
}

impl Node {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            status: NodeStatus::Concept,
        }
    }

    /// Identity used for every duplicate check
    pub fn key(&self) -> String {
        node_key(&self.name)
    }
}

/// Normalise a node name for dedup comparisons: trimmed and lowercased.
pub fn node_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Append `names` to `list`, skipping anything whose key is already present.
pub fn extend_unique<I, S>(list: &mut Vec<String>, names: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in names {
        let name = name.as_ref();
        let key = node_key(name);
        if key.is_empty() || list.iter().any(|existing| node_key(existing) == key) {
            continue;
        }
        list.push(name.to_string());
    }
}

/// One level of the topic tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Name of the node that produced this level, or [`ROOT_COLUMN_ID`]
    pub id: String,
    pub nodes: Vec<Node>,
    pub selected_node: Option<String>,
    /// Every name ever shown in this column, in first-seen order
    pub seen_nodes: Vec<String>,
}

impl Column {
    pub fn root(topic: &str) -> Self {
        Self {
            id: ROOT_COLUMN_ID.to_string(),
            nodes: vec![Node::new(topic, ROOT_NODE_DESC)],
            selected_node: None,
            seen_nodes: vec![topic.to_string()],
        }
    }

    pub fn expanded_from(parent: &str, nodes: Vec<Node>) -> Self {
        let mut seen_nodes = Vec::with_capacity(nodes.len());
        extend_unique(&mut seen_nodes, nodes.iter().map(|n| n.name.as_str()));
        Self {
            id: parent.to_string(),
            nodes,
            selected_node: None,
            seen_nodes,
        }
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_node
            .as_deref()
            .is_some_and(|selected| node_key(selected) == node_key(name))
    }
}

/// A clickable crumb naming one column's selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub column: usize,
    pub name: String,
}

/// One stop on the level timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStop {
    pub column: usize,
    pub label: String,
    pub is_current: bool,
}
