//! Miller-column topic tree.
//!
//! Columns form a prefix chain: column `i + 1` only exists as the expansion
//! of column `i`'s selected node. At most one expansion (select or
//! regenerate) is in flight at a time; further attempts are rejected with
//! [`NavigationError::Busy`] rather than queued.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{EventSender, WorkspaceEvent};
use crate::error::{BackendError, Error, NavigationError};
use crate::models::{
    extend_unique, node_key, Breadcrumb, Column, Node, TimelineStop, CONTEXT_SEPARATOR,
};
use crate::services::{Backend, Config, ExpandRequest};

/// Label of the first timeline stop
const HOME_LABEL: &str = "HOME";

/// Tickets are unique across every navigator in the process, so a reply
/// addressed to a dropped tree can never match a newer tree's request.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Backend answer to an expansion, tagged with the request's ticket
#[derive(Debug)]
pub struct ExpansionReply {
    pub ticket: u64,
    pub result: Result<Vec<Node>, BackendError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The node was already selected; nothing was requested
    AlreadySelected,
    Expanding { ticket: u64 },
}

#[derive(Debug)]
pub enum ExpansionOutcome {
    Expanded { column: usize },
    NoChildren { node: String },
    ExpandFailed { node: String, error: BackendError },
    Regenerated { column: usize },
    NoNewChildren { column: usize },
    RegenerateFailed { column: usize, error: BackendError },
    /// Reply to a request that is no longer pending
    Stale,
}

#[derive(Debug, Clone)]
enum ExpansionKind {
    Select { column: usize, node: String },
    Regenerate { column: usize },
}

#[derive(Debug)]
struct PendingExpansion {
    ticket: u64,
    kind: ExpansionKind,
    avoid: Vec<String>,
}

pub struct TopicNavigator {
    backend: Arc<dyn Backend>,
    events: EventSender,
    config: Arc<Config>,
    model: String,
    columns: Vec<Column>,
    pending: Option<PendingExpansion>,
}

impl TopicNavigator {
    pub fn new(
        topic: &str,
        backend: Arc<dyn Backend>,
        events: EventSender,
        config: Arc<Config>,
        model: &str,
    ) -> Result<Self, Error> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::EmptyTopic);
        }

        Ok(Self {
            backend,
            events,
            config,
            model: model.to_string(),
            columns: vec![Column::root(topic)],
            pending: None,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// True while an expansion request is outstanding
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    pub fn root_topic(&self) -> &str {
        self.columns[0].nodes.first().map(|n| n.name.as_str()).unwrap_or_default()
    }

    /// Selected names of columns `0..=index`, joined for a request context
    pub fn context_through(&self, index: usize) -> String {
        self.columns
            .iter()
            .take(index + 1)
            .filter_map(|c| c.selected_node.as_deref())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// The whole selected path, as sent with lesson requests
    pub fn context_path(&self) -> String {
        self.context_through(self.columns.len().saturating_sub(1))
    }

    /// Select `name` in column `column_index` and expand it into a new column
    pub fn select_node(
        &mut self,
        column_index: usize,
        name: &str,
    ) -> Result<SelectOutcome, NavigationError> {
        let column = self.checked_column(column_index)?;
        if column.is_selected(name) {
            return Ok(SelectOutcome::AlreadySelected);
        }
        if self.pending.is_some() {
            tracing::debug!("Ignoring selection of '{}' while thinking", name);
            return Err(NavigationError::Busy);
        }
        let key = node_key(name);
        let node_name = column
            .nodes
            .iter()
            .find(|n| n.key() == key)
            .map(|n| n.name.clone())
            .ok_or_else(|| NavigationError::UnknownNode {
                column: column_index,
                name: name.to_string(),
            })?;

        // Dedup hint comes from the siblings and the parent level as shown
        let mut avoid = Vec::new();
        extend_unique(&mut avoid, self.columns[column_index].node_names());
        if column_index > 0 {
            extend_unique(&mut avoid, self.columns[column_index - 1].node_names());
        }

        self.columns.truncate(column_index + 1);
        self.columns[column_index].selected_node = Some(node_name.clone());

        let request = ExpandRequest {
            node: node_name.clone(),
            context: self.context_through(column_index),
            model: self.model.clone(),
            temperature: self.config.expand_temperature,
            recent_nodes: avoid.clone(),
        };
        tracing::info!("Expanding '{}' (context: {})", node_name, request.context);

        let ticket = self.dispatch(
            ExpansionKind::Select {
                column: column_index,
                node: node_name,
            },
            request,
            avoid,
        );
        Ok(SelectOutcome::Expanding { ticket })
    }

    /// Re-fetch column `column_index`'s nodes, avoiding everything it has shown
    pub fn regenerate_level(&mut self, column_index: usize) -> Result<u64, NavigationError> {
        if column_index == 0 {
            return Err(NavigationError::RootRegeneration);
        }
        let column = self.checked_column(column_index)?;
        if self.pending.is_some() {
            return Err(NavigationError::Busy);
        }

        let parent_name = column.id.clone();
        let mut avoid = column.seen_nodes.clone();
        extend_unique(&mut avoid, self.columns[column_index - 1].node_names());
        extend_unique(&mut avoid, [parent_name.as_str()]);

        let request = ExpandRequest {
            node: parent_name.clone(),
            context: self.context_through(column_index - 1),
            model: self.model.clone(),
            temperature: self.config.regenerate_temperature,
            recent_nodes: avoid.clone(),
        };
        tracing::info!(
            "Regenerating level {} under '{}' avoiding {} names",
            column_index,
            parent_name,
            avoid.len()
        );

        Ok(self.dispatch(
            ExpansionKind::Regenerate {
                column: column_index,
            },
            request,
            avoid,
        ))
    }

    /// Keep columns `0..=index` and clear `index`'s selection.
    ///
    /// Jumping to the last column is a no-op.
    pub fn truncate_to(&mut self, index: usize) -> Result<(), NavigationError> {
        if self.pending.is_some() {
            return Err(NavigationError::Busy);
        }
        self.checked_column(index)?;
        if index == self.columns.len() - 1 {
            return Ok(());
        }

        self.columns.truncate(index + 1);
        self.columns[index].selected_node = None;
        tracing::debug!("Truncated tree to {} columns", self.columns.len());
        Ok(())
    }

    /// Jump to the level produced by breadcrumb `index` (the selection of
    /// column `index`), i.e. `truncate_to(index + 1)`.
    pub fn jump_to_breadcrumb(&mut self, index: usize) -> Result<(), NavigationError> {
        if self.pending.is_some() {
            return Err(NavigationError::Busy);
        }
        let has_selection = self.checked_column(index)?.selected_node.is_some();
        if !has_selection || index + 1 >= self.columns.len() {
            return Ok(());
        }
        self.truncate_to(index + 1)
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(column, c)| {
                c.selected_node.as_ref().map(|name| Breadcrumb {
                    column,
                    name: name.clone(),
                })
            })
            .collect()
    }

    pub fn timeline(&self) -> Vec<TimelineStop> {
        let last = self.columns.len() - 1;
        (0..self.columns.len())
            .map(|column| TimelineStop {
                column,
                label: if column == 0 {
                    HOME_LABEL.to_string()
                } else {
                    self.columns[column - 1].selected_node.clone().unwrap_or_default()
                },
                is_current: column == last,
            })
            .collect()
    }

    /// Apply a backend reply. Replies that don't match the pending ticket are
    /// dropped without touching the tree.
    pub fn apply_expansion(&mut self, reply: ExpansionReply) -> ExpansionOutcome {
        let pending = match self.pending.take() {
            Some(p) if p.ticket == reply.ticket => p,
            other => {
                self.pending = other;
                tracing::debug!("Dropping stale expansion reply {}", reply.ticket);
                return ExpansionOutcome::Stale;
            }
        };

        match (pending.kind, reply.result) {
            (ExpansionKind::Select { column, node }, Ok(children)) => {
                let children = filter_children(children, &pending.avoid);
                if children.is_empty() {
                    tracing::warn!("Expansion of '{}' produced no children", node);
                    return ExpansionOutcome::NoChildren { node };
                }
                tracing::info!("Expanded '{}' into {} children", node, children.len());
                self.columns.truncate(column + 1);
                self.columns.push(Column::expanded_from(&node, children));
                ExpansionOutcome::Expanded { column: column + 1 }
            }
            (ExpansionKind::Select { node, .. }, Err(error)) => {
                tracing::error!("Failed to expand '{}': {}", node, error);
                ExpansionOutcome::ExpandFailed { node, error }
            }
            (ExpansionKind::Regenerate { column }, Ok(children)) => {
                let children = filter_children(children, &pending.avoid);
                if children.is_empty() {
                    tracing::warn!("Regeneration of level {} found nothing new", column);
                    return ExpansionOutcome::NoNewChildren { column };
                }
                self.columns.truncate(column + 1);
                let level = &mut self.columns[column];
                extend_unique(&mut level.seen_nodes, children.iter().map(|n| n.name.as_str()));
                level.nodes = children;
                level.selected_node = None;
                ExpansionOutcome::Regenerated { column }
            }
            (ExpansionKind::Regenerate { column }, Err(error)) => {
                tracing::error!("Failed to regenerate level {}: {}", column, error);
                ExpansionOutcome::RegenerateFailed { column, error }
            }
        }
    }

    fn checked_column(&self, index: usize) -> Result<&Column, NavigationError> {
        self.columns.get(index).ok_or(NavigationError::ColumnOutOfRange {
            index,
            len: self.columns.len(),
        })
    }

    fn dispatch(&mut self, kind: ExpansionKind, request: ExpandRequest, avoid: Vec<String>) -> u64 {
        let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.pending = Some(PendingExpansion { ticket, kind, avoid });

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.expand(request).await;
            let _ = events.send(WorkspaceEvent::Expansion(ExpansionReply { ticket, result }));
        });

        ticket
    }
}

/// Drop children that repeat an avoided name or an earlier sibling
fn filter_children(children: Vec<Node>, avoid: &[String]) -> Vec<Node> {
    let mut seen: HashSet<String> = avoid.iter().map(|n| node_key(n)).collect();
    children
        .into_iter()
        .filter(|child| {
            let key = child.key();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake_backend::FakeBackend;
    use crate::state::EventReceiver;
    use tokio::sync::mpsc;

    fn navigator(fake: &Arc<FakeBackend>) -> (TopicNavigator, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let nav = TopicNavigator::new("Start", fake.clone(), tx, Arc::new(Config::default()), "llama3")
            .unwrap();
        (nav, rx)
    }

    async fn settle(nav: &mut TopicNavigator, rx: &mut EventReceiver) -> ExpansionOutcome {
        match rx.recv().await {
            Some(WorkspaceEvent::Expansion(reply)) => nav.apply_expansion(reply),
            other => panic!("expected expansion reply, got {:?}", other),
        }
    }

    async fn expand(
        nav: &mut TopicNavigator,
        rx: &mut EventReceiver,
        fake: &FakeBackend,
        column: usize,
        name: &str,
        children: &[&str],
    ) {
        fake.reply_children(children);
        nav.select_node(column, name).unwrap();
        let outcome = settle(nav, rx).await;
        assert!(matches!(outcome, ExpansionOutcome::Expanded { .. }), "{:?}", outcome);
    }

    fn names(column: &Column) -> Vec<&str> {
        column.node_names().collect()
    }

    #[tokio::test]
    async fn selecting_appends_child_column() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);

        fake.reply_children(&["Topic A", "Topic B"]);
        assert!(matches!(nav.select_node(0, "Start"), Ok(SelectOutcome::Expanding { .. })));
        assert!(nav.is_thinking());

        let outcome = settle(&mut nav, &mut rx).await;
        assert!(matches!(outcome, ExpansionOutcome::Expanded { column: 1 }));
        assert!(!nav.is_thinking());
        assert_eq!(nav.columns().len(), 2);
        assert_eq!(nav.columns()[1].id, "Start");
        assert_eq!(names(&nav.columns()[1]), vec!["Topic A", "Topic B"]);
        assert_eq!(nav.columns()[1].seen_nodes, vec!["Topic A", "Topic B"]);
        assert_eq!(nav.columns()[0].selected_node.as_deref(), Some("Start"));
    }

    #[tokio::test]
    async fn reselecting_selected_node_is_a_no_op() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["Topic A", "Topic B"]).await;

        assert_eq!(nav.select_node(0, "Start"), Ok(SelectOutcome::AlreadySelected));
        assert_eq!(nav.select_node(0, " start "), Ok(SelectOutcome::AlreadySelected));
        assert_eq!(nav.columns().len(), 2);
        assert_eq!(fake.expand_requests().len(), 1);
        assert!(!nav.is_thinking());
    }

    #[tokio::test]
    async fn second_expansion_while_thinking_is_rejected() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["Topic A", "Topic B"]).await;

        fake.reply_children(&["Deep 1"]);
        nav.select_node(1, "Topic A").unwrap();
        assert_eq!(nav.select_node(1, "Topic B"), Err(NavigationError::Busy));
        assert_eq!(nav.regenerate_level(1), Err(NavigationError::Busy));
        assert_eq!(nav.truncate_to(0), Err(NavigationError::Busy));
        assert_eq!(nav.jump_to_breadcrumb(0), Err(NavigationError::Busy));

        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.columns().len(), 3);
        assert_eq!(nav.columns()[1].selected_node.as_deref(), Some("Topic A"));
        assert_eq!(fake.expand_requests().len(), 2);
    }

    #[tokio::test]
    async fn expansion_request_carries_context_and_dedup_hint() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["Topic A", "Topic B"]).await;
        expand(&mut nav, &mut rx, &fake, 1, "Topic A", &["Leaf"]).await;

        let requests = fake.expand_requests();
        assert_eq!(requests[0].node, "Start");
        assert_eq!(requests[0].context, "Start");
        assert_eq!(requests[0].recent_nodes, vec!["Start"]);
        assert_eq!(requests[0].temperature, 0.5);

        assert_eq!(requests[1].node, "Topic A");
        assert_eq!(requests[1].context, "Start/Topic A");
        assert_eq!(requests[1].recent_nodes, vec!["Topic A", "Topic B", "Start"]);
        assert_eq!(requests[1].model, "llama3");
    }

    #[tokio::test]
    async fn selecting_a_sibling_truncates_descendants() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["Topic A", "Topic B"]).await;
        expand(&mut nav, &mut rx, &fake, 1, "Topic A", &["A1", "A2"]).await;
        expand(&mut nav, &mut rx, &fake, 2, "A1", &["A1x"]).await;
        assert_eq!(nav.columns().len(), 4);

        fake.reply_children(&["B1"]);
        nav.select_node(1, "Topic B").unwrap();
        // descendants are gone before the reply arrives
        assert_eq!(nav.columns().len(), 2);
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.columns().len(), 3);
        assert_eq!(nav.columns()[2].id, "Topic B");
    }

    #[tokio::test]
    async fn regeneration_avoids_parent_and_seen_names() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["Topic A", "Topic B"]).await;

        fake.reply_children(&["Topic C", "Topic D"]);
        nav.regenerate_level(1).unwrap();
        let outcome = settle(&mut nav, &mut rx).await;
        assert!(matches!(outcome, ExpansionOutcome::Regenerated { column: 1 }));

        let request = fake.expand_requests().pop().unwrap();
        assert_eq!(request.node, "Start");
        assert_eq!(request.context, "Start");
        assert_eq!(request.temperature, 0.7);
        for name in ["Start", "Topic A", "Topic B"] {
            assert!(request.recent_nodes.iter().any(|n| n == name), "missing {name}");
        }
        assert_eq!(names(&nav.columns()[1]), vec!["Topic C", "Topic D"]);
    }

    #[tokio::test]
    async fn seen_nodes_accumulate_across_regenerations() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["A", "B"]).await;

        fake.reply_children(&["C", "D"]);
        nav.regenerate_level(1).unwrap();
        settle(&mut nav, &mut rx).await;

        fake.reply_children(&["E", "F"]);
        nav.regenerate_level(1).unwrap();
        settle(&mut nav, &mut rx).await;

        assert_eq!(nav.columns()[1].seen_nodes, vec!["A", "B", "C", "D", "E", "F"]);
        let last = fake.expand_requests().pop().unwrap();
        for name in ["A", "B", "C", "D", "Start"] {
            assert!(last.recent_nodes.iter().any(|n| n == name), "missing {name}");
        }
    }

    #[tokio::test]
    async fn regeneration_clears_selection_and_descendants() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["A", "B"]).await;
        expand(&mut nav, &mut rx, &fake, 1, "A", &["A1"]).await;
        expand(&mut nav, &mut rx, &fake, 2, "A1", &["A1x"]).await;

        fake.reply_children(&["Z1", "Z2"]);
        nav.regenerate_level(2).unwrap();
        settle(&mut nav, &mut rx).await;

        assert_eq!(nav.columns().len(), 3);
        assert!(nav.columns()[2].selected_node.is_none());
        assert_eq!(names(&nav.columns()[2]), vec!["Z1", "Z2"]);
        assert_eq!(nav.columns()[1].selected_node.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn regeneration_with_only_repeats_leaves_column_unchanged() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["A", "B"]).await;
        let before = nav.columns().to_vec();

        fake.reply_children(&["a", "B ", "start"]);
        nav.regenerate_level(1).unwrap();
        let outcome = settle(&mut nav, &mut rx).await;

        assert!(matches!(outcome, ExpansionOutcome::NoNewChildren { column: 1 }));
        assert_eq!(nav.columns(), before.as_slice());

        fake.reply_expand_error();
        nav.regenerate_level(1).unwrap();
        let outcome = settle(&mut nav, &mut rx).await;
        assert!(matches!(outcome, ExpansionOutcome::RegenerateFailed { column: 1, .. }));
        assert_eq!(nav.columns(), before.as_slice());
    }

    #[tokio::test]
    async fn root_cannot_be_regenerated() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, _rx) = navigator(&fake);
        assert_eq!(nav.regenerate_level(0), Err(NavigationError::RootRegeneration));
        assert_eq!(
            nav.regenerate_level(3),
            Err(NavigationError::ColumnOutOfRange { index: 3, len: 1 })
        );
        assert!(fake.expand_requests().is_empty());
    }

    #[tokio::test]
    async fn empty_expansion_keeps_tree_height() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);

        fake.reply_children(&[]);
        nav.select_node(0, "Start").unwrap();
        let outcome = settle(&mut nav, &mut rx).await;

        assert!(matches!(outcome, ExpansionOutcome::NoChildren { ref node } if node == "Start"));
        assert_eq!(nav.columns().len(), 1);
        assert!(!nav.is_thinking());
    }

    #[tokio::test]
    async fn failed_expansion_clears_thinking() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);

        fake.reply_expand_error();
        nav.select_node(0, "Start").unwrap();
        let outcome = settle(&mut nav, &mut rx).await;

        assert!(matches!(outcome, ExpansionOutcome::ExpandFailed { .. }));
        assert_eq!(nav.columns().len(), 1);
        assert!(!nav.is_thinking());
    }

    #[tokio::test]
    async fn duplicate_children_are_filtered() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);

        fake.reply_children(&["Optics", "optics", "Start", "", "Waves"]);
        nav.select_node(0, "Start").unwrap();
        settle(&mut nav, &mut rx).await;

        assert_eq!(names(&nav.columns()[1]), vec!["Optics", "Waves"]);
    }

    #[tokio::test]
    async fn truncate_keeps_prefix_and_clears_selection() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["A", "B"]).await;
        expand(&mut nav, &mut rx, &fake, 1, "A", &["A1", "A2"]).await;
        expand(&mut nav, &mut rx, &fake, 2, "A1", &["A1x"]).await;
        let n = nav.columns().len();
        assert_eq!(n, 4);

        // jumping to the current level changes nothing
        nav.truncate_to(n - 1).unwrap();
        assert_eq!(nav.columns().len(), n);

        nav.truncate_to(1).unwrap();
        assert_eq!(nav.columns().len(), 2);
        assert!(nav.columns()[1].selected_node.is_none());
        assert_eq!(nav.columns()[0].selected_node.as_deref(), Some("Start"));

        assert_eq!(
            nav.truncate_to(5),
            Err(NavigationError::ColumnOutOfRange { index: 5, len: 2 })
        );

        // the cleared node can be expanded again
        fake.reply_children(&["A1"]);
        assert!(matches!(nav.select_node(1, "A"), Ok(SelectOutcome::Expanding { .. })));
    }

    #[tokio::test]
    async fn breadcrumb_jump_keeps_the_level_it_produced() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["A", "B"]).await;
        expand(&mut nav, &mut rx, &fake, 1, "A", &["A1", "A2"]).await;
        expand(&mut nav, &mut rx, &fake, 2, "A1", &["A1x"]).await;

        let crumbs = nav.breadcrumbs();
        assert_eq!(
            crumbs.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Start", "A", "A1"]
        );

        nav.jump_to_breadcrumb(0).unwrap();
        assert_eq!(nav.columns().len(), 2);
        assert!(nav.columns()[1].selected_node.is_none());
        assert_eq!(nav.breadcrumbs().len(), 1);
    }

    #[tokio::test]
    async fn timeline_labels_each_level_by_its_parent() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);
        expand(&mut nav, &mut rx, &fake, 0, "Start", &["A", "B"]).await;
        expand(&mut nav, &mut rx, &fake, 1, "B", &["B1"]).await;

        let stops = nav.timeline();
        assert_eq!(
            stops.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
            vec!["HOME", "Start", "B"]
        );
        assert!(stops[2].is_current);
        assert!(!stops[0].is_current);
        assert_eq!(nav.context_path(), "Start/B");
    }

    #[tokio::test]
    async fn mismatched_ticket_is_ignored() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, mut rx) = navigator(&fake);

        fake.reply_children(&["A"]);
        let ticket = match nav.select_node(0, "Start").unwrap() {
            SelectOutcome::Expanding { ticket } => ticket,
            other => panic!("unexpected {:?}", other),
        };
        let stale = ExpansionReply {
            ticket: ticket + 7,
            result: Ok(crate::services::fake_backend::nodes(&["Ghost"])),
        };
        assert!(matches!(nav.apply_expansion(stale), ExpansionOutcome::Stale));
        assert!(nav.is_thinking());

        settle(&mut nav, &mut rx).await;
        assert_eq!(names(&nav.columns()[1]), vec!["A"]);
    }

    #[tokio::test]
    async fn unknown_node_and_blank_topic_are_rejected() {
        let fake = Arc::new(FakeBackend::new());
        let (mut nav, _rx) = navigator(&fake);
        assert_eq!(
            nav.select_node(0, "Nowhere"),
            Err(NavigationError::UnknownNode {
                column: 0,
                name: "Nowhere".to_string()
            })
        );
        assert!(!nav.is_thinking());

        let (tx, _rx2) = mpsc::unbounded_channel();
        assert!(matches!(
            TopicNavigator::new("   ", fake.clone(), tx, Arc::new(Config::default()), "m"),
            Err(Error::EmptyTopic)
        ));
    }
}
