use std::collections::{HashMap, HashSet};

use crate::domain::entities::Term;

/// A taxonomy term with its resolved children, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TermNode {
    pub term: Term,
    pub children: Vec<TermNode>,
}

/// Build a forest from a flat taxonomy listing.
///
/// Input is de-duplicated by `db_id` (first occurrence wins, later duplicates
/// are dropped silently). A term whose `parent_db_id` is absent, zero, equal
/// to its own `db_id`, or not present in the listing becomes a root.
/// Self-reference is deliberately read as "no parent": attaching a node under
/// itself would make it unreachable, so the safe interpretation is a root.
///
/// Sibling lists — including the root list — are sorted ascending by `name`,
/// so the output is deterministic regardless of input order (apart from the
/// order-sensitive de-duplication rule). The builder is total: it never
/// validates acyclicity, but each node is consumed exactly once during
/// assembly, so malformed parent links cannot loop. Members of a parent cycle
/// are promoted to roots in first-seen order instead of being dropped.
pub fn build_term_tree(terms: &[Term]) -> Vec<TermNode> {
    let mut order: Vec<i64> = Vec::with_capacity(terms.len());
    let mut nodes: HashMap<i64, TermNode> = HashMap::with_capacity(terms.len());

    for term in terms {
        if nodes.contains_key(&term.db_id) {
            continue;
        }
        order.push(term.db_id);
        nodes.insert(
            term.db_id,
            TermNode {
                term: term.clone(),
                children: Vec::new(),
            },
        );
    }

    let mut children: HashMap<Option<i64>, Vec<i64>> = HashMap::new();
    for &db_id in &order {
        let parent = nodes
            .get(&db_id)
            .and_then(|node| effective_parent(&node.term, &nodes));
        children.entry(parent).or_default().push(db_id);
    }

    for ids in children.values_mut() {
        ids.sort_by(|a, b| {
            let left = nodes.get(a).map(|n| n.term.name.as_str()).unwrap_or("");
            let right = nodes.get(b).map(|n| n.term.name.as_str()).unwrap_or("");
            left.cmp(right)
        });
    }

    let mut working = nodes;
    let mut roots = Vec::new();

    if let Some(root_ids) = children.get(&None) {
        for &root_id in root_ids {
            if let Some(node) = assemble(root_id, &mut working, &children) {
                roots.push(node);
            }
        }
    }

    // Anything still unconsumed sits on a parent cycle; surface it as a root
    // rather than losing the subtree.
    for &db_id in &order {
        if working.contains_key(&db_id) {
            if let Some(node) = assemble(db_id, &mut working, &children) {
                roots.push(node);
            }
        }
    }

    roots.sort_by(|a, b| a.term.name.cmp(&b.term.name));
    roots
}

fn effective_parent(term: &Term, nodes: &HashMap<i64, TermNode>) -> Option<i64> {
    match term.parent_db_id {
        Some(parent) if parent != 0 && parent != term.db_id && nodes.contains_key(&parent) => {
            Some(parent)
        }
        _ => None,
    }
}

fn assemble(
    id: i64,
    nodes: &mut HashMap<i64, TermNode>,
    children: &HashMap<Option<i64>, Vec<i64>>,
) -> Option<TermNode> {
    let mut node = nodes.remove(&id)?;

    if let Some(child_ids) = children.get(&Some(id)) {
        for &child_id in child_ids {
            if let Some(child) = assemble(child_id, nodes, children) {
                node.children.push(child);
            }
        }
    }

    Some(node)
}

/// Keep only branches that contain at least one selected term.
///
/// Post-order filter: a node survives when its `db_id` is in the selection or
/// at least one of its children survived. The input forest is not mutated;
/// kept siblings retain their relative order. Identifiers in the selection
/// that do not occur in the forest are ignored.
pub fn prune_tree_to_selection(forest: &[TermNode], selected: &HashSet<i64>) -> Vec<TermNode> {
    forest
        .iter()
        .filter_map(|node| prune_node(node, selected))
        .collect()
}

fn prune_node(node: &TermNode, selected: &HashSet<i64>) -> Option<TermNode> {
    let children: Vec<TermNode> = node
        .children
        .iter()
        .filter_map(|child| prune_node(child, selected))
        .collect();

    if selected.contains(&node.term.db_id) || !children.is_empty() {
        Some(TermNode {
            term: node.term.clone(),
            children,
        })
    } else {
        None
    }
}

/// Go straight from a flat term listing plus selected ids to a pruned forest.
pub fn make_tech_tree(terms: &[Term], selected: &HashSet<i64>) -> Vec<TermNode> {
    if terms.is_empty() || selected.is_empty() {
        return Vec::new();
    }
    let forest = build_term_tree(terms);
    prune_tree_to_selection(&forest, selected)
}
