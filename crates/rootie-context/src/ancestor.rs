use std::collections::{HashMap, HashSet};

use rootie_llm::Message;
use rootie_types::DialogueNode;

use crate::strategy::{ContextStrategy, ContextWindow};
use crate::templates::DEFAULT_SYSTEM_PROMPT;

/// Walks parent links from the target up to the root
pub struct AncestorPathStrategy {
    system_prompt: String,
}

impl AncestorPathStrategy {
    pub fn new() -> Self {
        Self::with_system_prompt(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn with_system_prompt(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }
}

impl Default for AncestorPathStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStrategy for AncestorPathStrategy {
    fn build(&self, target_parent_id: Option<&str>, known_nodes: &[DialogueNode]) -> ContextWindow {
        let path = ancestor_path(target_parent_id, known_nodes);

        let mut messages = Vec::with_capacity(path.len() * 2);
        for node in &path {
            messages.push(Message::human(node.user_prompt.clone()));
            messages.push(Message::ai(node.ai_response.clone()));
        }

        tracing::debug!(
            target_parent_id = ?target_parent_id,
            known_nodes = known_nodes.len(),
            turns = path.len(),
            "Built context"
        );

        ContextWindow {
            system_prompt: self.system_prompt.clone(),
            messages,
        }
    }
}

/// Nodes from the root down to `target_parent_id` (inclusive).
///
/// The walk stops at a missing parent id (the context is truncated there) or
/// when an id repeats (a cycle). Neither is an error; both are logged. When
/// `known_nodes` holds duplicate ids the last one wins.
pub fn ancestor_path<'a>(
    target_parent_id: Option<&str>,
    known_nodes: &'a [DialogueNode],
) -> Vec<&'a DialogueNode> {
    let Some(start) = target_parent_id.filter(|id| !id.is_empty()) else {
        return Vec::new();
    };

    let by_id: HashMap<&str, &DialogueNode> = known_nodes
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect();

    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(start);

    while let Some(id) = current.filter(|id| !id.is_empty()) {
        if !visited.insert(id) {
            tracing::warn!(node_id = %id, path_len = path.len(), "Cycle in parent chain, stopping context walk");
            break;
        }

        let Some(&node) = by_id.get(id) else {
            tracing::warn!(node_id = %id, path_len = path.len(), "Parent node not found, context truncated");
            break;
        };

        path.push(node);
        if node.is_root() {
            break;
        }
        current = node.parent_node_id.as_deref();
    }

    path.reverse();
    path
}

/// Context for a turn whose parent is `target_parent_id`, using the default system prompt
pub fn build_context(target_parent_id: Option<&str>, known_nodes: &[DialogueNode]) -> Vec<Message> {
    AncestorPathStrategy::new()
        .build(target_parent_id, known_nodes)
        .into_messages()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(id: &str, parent: Option<&str>) -> DialogueNode {
        let node = DialogueNode::new(id, format!("q-{}", id)).with_response(format!("a-{}", id));
        match parent {
            Some(p) => node.with_parent(p),
            None => node,
        }
    }

    #[test]
    fn test_no_target_yields_system_only() {
        let nodes = vec![turn("root", None)];
        assert_eq!(build_context(None, &nodes), vec![Message::system(DEFAULT_SYSTEM_PROMPT)]);
        assert_eq!(build_context(Some(""), &nodes), vec![Message::system(DEFAULT_SYSTEM_PROMPT)]);
    }

    #[test]
    fn test_chain_in_root_first_order() {
        let nodes = vec![
            turn("c", Some("b")),
            turn("root", None),
            turn("b", Some("a")),
            turn("a", Some("root")),
        ];

        let messages = build_context(Some("c"), &nodes);
        assert_eq!(messages.len(), 9);
        assert_eq!(messages[0], Message::system(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(messages[1], Message::human("q-root"));
        assert_eq!(messages[2], Message::ai("a-root"));
        assert_eq!(messages[3], Message::human("q-a"));
        assert_eq!(messages[7], Message::human("q-c"));
        assert_eq!(messages[8], Message::ai("a-c"));
    }

    #[test]
    fn test_three_turn_chain_is_seven_messages() {
        let nodes = vec![turn("a", None), turn("b", Some("a")), turn("c", Some("b"))];

        let messages = build_context(Some("c"), &nodes);
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[1], Message::human("q-a"));
        assert_eq!(messages[4], Message::ai("a-b"));
        assert_eq!(messages[6], Message::ai("a-c"));
    }

    #[test]
    fn test_dangling_parent_truncates() {
        let nodes = vec![turn("a", Some("x")), turn("b", Some("a"))];

        let messages = build_context(Some("b"), &nodes);
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1], Message::human("q-a"));
        assert_eq!(messages[3], Message::human("q-b"));
    }

    #[test]
    fn test_branches_share_history_up_to_fork() {
        let nodes = vec![
            turn("root", None),
            turn("left", Some("root")),
            turn("right", Some("root")),
        ];

        let left = ancestor_path(Some("left"), &nodes);
        let right = ancestor_path(Some("right"), &nodes);
        assert_eq!(left[0].id, "root");
        assert_eq!(right[0].id, "root");
        assert_eq!(left[1].id, "left");
        assert_eq!(right[1].id, "right");
    }

    #[test]
    fn test_unknown_target_yields_system_only() {
        let nodes = vec![turn("root", None)];
        assert_eq!(build_context(Some("ghost"), &nodes).len(), 1);
    }

    #[test]
    fn test_self_parent_terminates() {
        let nodes = vec![turn("loop", Some("loop"))];
        let path = ancestor_path(Some("loop"), &nodes);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_two_node_cycle_terminates() {
        let nodes = vec![turn("x", Some("y")), turn("y", Some("x"))];
        let messages = build_context(Some("x"), &nodes);
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1], Message::human("q-y"));
        assert_eq!(messages[3], Message::human("q-x"));
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let stale = turn("a", None);
        let fresh = DialogueNode::new("a", "q-new").with_response("a-new");
        let nodes = vec![stale, fresh];

        let messages = build_context(Some("a"), &nodes);
        assert_eq!(messages[1], Message::human("q-new"));
    }

    #[test]
    fn test_walk_stops_at_node_with_blank_parent() {
        let root = DialogueNode::new("a", "q-a").with_response("r-a").with_parent("");
        let nodes = vec![root, turn("b", Some("a"))];

        let path = ancestor_path(Some("b"), &nodes);
        let ids: Vec<_> = path.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(path[0].is_root());
    }

    #[test]
    fn test_custom_system_prompt() {
        let window = AncestorPathStrategy::with_system_prompt("Be terse.").build(None, &[]);
        assert_eq!(window.turns(), 0);
        assert_eq!(window.into_messages(), vec![Message::system("Be terse.")]);
    }
}
