//! The canonical task forest and the structural operations on it.
//!
//! Every operation takes `&self` and returns a new tree. Operations addressing
//! an id that no longer exists, and moves that would break the tree, return
//! an unchanged copy instead of failing: stale ids are expected when user
//! actions race each other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::completion::{apply_completion, attach_recurrence, detach_recurrence, merge_completion};
use crate::error::CoreError;
use crate::models::{TaskId, TaskNode, TaskUpdate};
use crate::recurrence::next_occurrence;

/// Ordered forest of root tasks. Serializes as a JSON array of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTree {
    roots: Vec<TaskNode>,
}

impl TaskTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_roots(roots: Vec<TaskNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[TaskNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<TaskNode> {
        self.roots
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.roots.iter().map(TaskNode::subtree_size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn find(&self, id: &TaskId) -> Option<&TaskNode> {
        locate(&self.roots, None, id).map(|(_, node)| node)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.find(id).is_some()
    }

    /// Parent of `id`; `None` for roots and unknown ids.
    pub fn parent_of(&self, id: &TaskId) -> Option<&TaskNode> {
        locate(&self.roots, None, id).and_then(|(parent, _)| parent)
    }

    /// Ancestors of `id`, nearest first. Empty for roots and unknown ids.
    pub fn ancestors(&self, id: &TaskId) -> Vec<&TaskNode> {
        let mut path = Vec::new();
        if path_to(&self.roots, id, &mut path) {
            path.reverse();
            path
        } else {
            Vec::new()
        }
    }

    pub fn is_descendant_of(&self, id: &TaskId, ancestor: &TaskId) -> bool {
        self.ancestors(id).iter().any(|node| node.id == *ancestor)
    }

    /// Pre-order listing of every node with its depth (roots at depth 0).
    pub fn flatten(&self) -> Vec<(usize, &TaskNode)> {
        let mut out = Vec::with_capacity(self.len());
        flatten_into(&self.roots, 0, &mut out);
        out
    }

    /// Nodes whose id starts with `prefix`, in pre-order.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Vec<&TaskNode> {
        self.flatten()
            .into_iter()
            .map(|(_, node)| node)
            .filter(|node| node.id.as_str().starts_with(prefix))
            .collect()
    }

    /// Shortest prefix of every id, at least `min_len` characters long, that
    /// no other id in the tree starts with. Ids shorter than that are kept whole.
    pub fn short_ids(&self, min_len: usize) -> HashMap<TaskId, String> {
        let mut ids: Vec<&TaskId> = self.flatten().into_iter().map(|(_, node)| &node.id).collect();
        ids.sort();

        // In sorted order the longest prefix an id shares is with a neighbour.
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let before = i
                    .checked_sub(1)
                    .map_or(0, |prev| common_prefix_len(ids[prev], id));
                let after = ids.get(i + 1).map_or(0, |next| common_prefix_len(id, next));
                let len = (before.max(after) + 1).max(min_len);
                ((*id).clone(), id.as_str().chars().take(len).collect())
            })
            .collect()
    }

    /// [`short_ids`](Self::short_ids) entry for a single id.
    pub fn short_id(&self, id: &TaskId, min_len: usize) -> String {
        self.short_ids(min_len)
            .remove(id)
            .unwrap_or_else(|| id.to_string())
    }

    // ------------------------------------------------------------------
    // Structural mutators
    // ------------------------------------------------------------------

    /// Appends a new empty child to `parent_id`.
    ///
    /// The child is scheduled on the parent's scheduled date, or on `selected`
    /// when that date lies after `today`. Returns the new tree and the new
    /// node's id; an unknown parent leaves the tree unchanged and yields `None`.
    pub fn insert_child(
        &self,
        parent_id: &TaskId,
        selected: NaiveDate,
        today: NaiveDate,
    ) -> (TaskTree, Option<TaskId>) {
        let mut tree = self.clone();
        let Some(parent) = find_mut(&mut tree.roots, parent_id) else {
            debug!(parent = %parent_id, "insert under unknown parent ignored");
            return (tree, None);
        };

        let mut child = TaskNode::new("");
        child.scheduled_date = parent
            .scheduled_date
            .or_else(|| (selected > today).then_some(selected));
        let id = child.id.clone();
        parent.children.push(child);
        (tree, Some(id))
    }

    /// Appends a new empty root, scheduled on `selected` when that date lies
    /// after `today`.
    pub fn insert_root(&self, selected: NaiveDate, today: NaiveDate) -> (TaskTree, TaskId) {
        let mut tree = self.clone();
        let mut node = TaskNode::new("");
        node.scheduled_date = (selected > today).then_some(selected);
        let id = node.id.clone();
        tree.roots.push(node);
        (tree, id)
    }

    /// Removes `id` and its entire subtree.
    pub fn delete_subtree(&self, id: &TaskId) -> TaskTree {
        let mut tree = self.clone();
        match take_node(&mut tree.roots, id) {
            Some(removed) => debug!(task = %id, nodes = removed.subtree_size(), "deleted subtree"),
            None => debug!(task = %id, "delete of unknown task ignored"),
        }
        tree
    }

    /// Why moving `id` under `new_parent` (`None` = root level) would be
    /// rejected, if it would.
    pub fn check_move(&self, id: &TaskId, new_parent: Option<&TaskId>) -> Result<(), CoreError> {
        let Some((current_parent, _)) = locate(&self.roots, None, id) else {
            return Err(CoreError::NotFound(id.to_string()));
        };
        let current_parent = current_parent.map(|p| &p.id);

        match new_parent {
            Some(target) if target == id => {
                Err(CoreError::CircularMove(id.to_string(), target.to_string()))
            }
            Some(target) if !self.contains(target) => Err(CoreError::NotFound(target.to_string())),
            Some(target) if self.is_descendant_of(target, id) => {
                Err(CoreError::CircularMove(id.to_string(), target.to_string()))
            }
            _ if current_parent == new_parent => Err(CoreError::NoOpMove(id.to_string())),
            _ => Ok(()),
        }
    }

    /// Moves `id` with its subtree to be the last child of `new_parent`, or
    /// the last root when `new_parent` is `None`.
    ///
    /// Moves onto itself, into its own subtree, to where it already is, or
    /// involving unknown ids leave the tree unchanged.
    pub fn move_node(&self, id: &TaskId, new_parent: Option<&TaskId>) -> TaskTree {
        if let Err(reason) = self.check_move(id, new_parent) {
            debug!(task = %id, %reason, "move rejected");
            return self.clone();
        }

        let mut tree = self.clone();
        let Some(node) = take_node(&mut tree.roots, id) else {
            return self.clone();
        };
        match new_parent {
            None => tree.roots.push(node),
            Some(target) => match find_mut(&mut tree.roots, target) {
                Some(parent) => parent.children.push(node),
                None => return self.clone(),
            },
        }
        tree
    }

    // ------------------------------------------------------------------
    // Node updates
    // ------------------------------------------------------------------

    /// Applies a partial update to `id`.
    ///
    /// The schedule is applied before the recurrence change, so a schedule set
    /// in the same update seeds the anchor of a newly attached rule. `for_date`
    /// and `today` feed the recurrence start date when the task has no schedule.
    pub fn update_task(
        &self,
        id: &TaskId,
        update: TaskUpdate,
        for_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> TaskTree {
        let mut tree = self.clone();
        let Some(node) = find_mut(&mut tree.roots, id) else {
            debug!(task = %id, "update of unknown task ignored");
            return tree;
        };

        if let Some(text) = update.text {
            node.text = text;
        }
        if let Some(scheduled) = update.scheduled_date {
            node.scheduled_date = scheduled;
        }
        match update.recurrence {
            Some(Some(rule)) => *node = attach_recurrence(node, rule, for_date, today),
            Some(None) => *node = detach_recurrence(node),
            None => {}
        }
        if let Some(completion) = update.completion {
            *node = merge_completion(node, completion);
        }
        for field in update.set_fields {
            node.set_field(field.key, field.value);
        }
        for key in &update.remove_fields {
            node.remove_field(key);
        }
        tree
    }

    /// Marks `id` complete or incomplete for `for_date`.
    ///
    /// Completing an occurrence of a recurring task on or after its anchor
    /// also rolls the schedule forward to the next occurrence after
    /// `for_date`. Marking incomplete never moves the schedule.
    pub fn toggle_completion(&self, id: &TaskId, completed: bool, for_date: NaiveDate) -> TaskTree {
        let mut tree = self.clone();
        let Some(node) = find_mut(&mut tree.roots, id) else {
            debug!(task = %id, "completion of unknown task ignored");
            return tree;
        };

        let mut updated = merge_completion(node, apply_completion(node, completed, for_date));
        let due = updated.anchor().is_some_and(|anchor| for_date >= anchor);
        if completed && due {
            if let Some(next) = next_occurrence(&updated, for_date) {
                debug!(task = %id, %next, "advanced recurring task");
                updated.scheduled_date = Some(next);
            }
        }
        *node = updated;
        tree
    }

    /// Copy of the tree without view annotations, as it should be persisted.
    pub fn without_annotations(&self) -> TaskTree {
        let mut tree = self.clone();
        clear_annotations(&mut tree.roots);
        tree
    }
}

impl From<Vec<TaskNode>> for TaskTree {
    fn from(roots: Vec<TaskNode>) -> Self {
        Self::from_roots(roots)
    }
}

fn common_prefix_len(a: &TaskId, b: &TaskId) -> usize {
    a.as_str()
        .chars()
        .zip(b.as_str().chars())
        .take_while(|(x, y)| x == y)
        .count()
}

fn locate<'a>(
    nodes: &'a [TaskNode],
    parent: Option<&'a TaskNode>,
    id: &TaskId,
) -> Option<(Option<&'a TaskNode>, &'a TaskNode)> {
    for node in nodes {
        if node.id == *id {
            return Some((parent, node));
        }
        if let Some(found) = locate(&node.children, Some(node), id) {
            return Some(found);
        }
    }
    None
}

fn path_to<'a>(nodes: &'a [TaskNode], id: &TaskId, path: &mut Vec<&'a TaskNode>) -> bool {
    for node in nodes {
        if node.id == *id {
            return true;
        }
        path.push(node);
        if path_to(&node.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn find_mut<'a>(nodes: &'a mut [TaskNode], id: &TaskId) -> Option<&'a mut TaskNode> {
    for node in nodes.iter_mut() {
        if node.id == *id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn take_node(nodes: &mut Vec<TaskNode>, id: &TaskId) -> Option<TaskNode> {
    if let Some(pos) = nodes.iter().position(|node| node.id == *id) {
        return Some(nodes.remove(pos));
    }
    nodes
        .iter_mut()
        .find_map(|node| take_node(&mut node.children, id))
}

fn flatten_into<'a>(nodes: &'a [TaskNode], depth: usize, out: &mut Vec<(usize, &'a TaskNode)>) {
    for node in nodes {
        out.push((depth, node));
        flatten_into(&node.children, depth + 1, out);
    }
}

fn clear_annotations(nodes: &mut [TaskNode]) {
    for node in nodes {
        node.original_child_count = None;
        clear_annotations(&mut node.children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_day;
    use crate::models::{Field, Recurrence, TaskKind};

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    fn id(s: &str) -> TaskId {
        TaskId::from(s)
    }

    /// a -> (b -> (c), d), e
    fn sample_tree() -> TaskTree {
        TaskTree::from_roots(vec![
            TaskNode::with_id("a", "A")
                .with_child(TaskNode::with_id("b", "B").with_child(TaskNode::with_id("c", "C")))
                .with_child(TaskNode::with_id("d", "D")),
            TaskNode::with_id("e", "E"),
        ])
    }

    fn layout(tree: &TaskTree) -> Vec<(usize, String)> {
        tree.flatten()
            .into_iter()
            .map(|(depth, node)| (depth, node.id.to_string()))
            .collect()
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_find_parent_and_ancestors() {
            let tree = sample_tree();
            assert_eq!(tree.len(), 5);
            assert_eq!(tree.find(&id("c")).map(|n| n.text.as_str()), Some("C"));
            assert_eq!(tree.parent_of(&id("c")).map(|n| n.id.clone()), Some(id("b")));
            assert!(tree.parent_of(&id("a")).is_none());
            let ancestors: Vec<_> = tree.ancestors(&id("c")).iter().map(|n| n.id.clone()).collect();
            assert_eq!(ancestors, vec![id("b"), id("a")]);
            assert!(tree.ancestors(&id("zz")).is_empty());
            assert!(tree.is_descendant_of(&id("c"), &id("a")));
            assert!(!tree.is_descendant_of(&id("a"), &id("c")));
        }

        #[test]
        fn test_short_ids_are_unique_prefixes() {
            let tree = TaskTree::from_roots(vec![
                TaskNode::with_id("1714953600000", "Imported")
                    .with_child(TaskNode::with_id("1714953600001", "Nested")),
                TaskNode::with_id("0192a4b1-aaaa", "Fresh"),
                TaskNode::with_id("ab", "Tiny"),
            ]);
            let shorts = tree.short_ids(7);

            assert_eq!(shorts[&id("1714953600000")], "1714953600000");
            assert_eq!(shorts[&id("1714953600001")], "1714953600001");
            assert_eq!(shorts[&id("0192a4b1-aaaa")], "0192a4b");
            assert_eq!(shorts[&id("ab")], "ab");
            for (full, short) in &shorts {
                let matches = tree.find_by_id_prefix(short);
                assert!(matches.iter().any(|node| node.id == *full));
                assert!(matches.len() == 1 || short == full.as_str());
            }
            assert_eq!(tree.short_id(&id("zz"), 7), "zz");
        }

        #[test]
        fn test_short_ids_grow_only_as_far_as_needed() {
            let tree = TaskTree::from_roots(vec![
                TaskNode::with_id("aaaaaaaa1", "One"),
                TaskNode::with_id("aaaaaaab2", "Two"),
                TaskNode::with_id("bbbbbbbbb", "Three"),
            ]);
            assert_eq!(tree.short_id(&id("aaaaaaaa1"), 7), "aaaaaaaa");
            assert_eq!(tree.short_id(&id("aaaaaaab2"), 7), "aaaaaaab");
            assert_eq!(tree.short_id(&id("bbbbbbbbb"), 7), "bbbbbbb");
        }

        #[test]
        fn test_flatten_is_preorder_with_depth() {
            assert_eq!(
                layout(&sample_tree()),
                vec![
                    (0, "a".to_string()),
                    (1, "b".to_string()),
                    (2, "c".to_string()),
                    (1, "d".to_string()),
                    (0, "e".to_string()),
                ]
            );
        }

        #[test]
        fn test_find_by_id_prefix() {
            let tree = TaskTree::from_roots(vec![
                TaskNode::with_id("abc1", "One"),
                TaskNode::with_id("abd2", "Two").with_child(TaskNode::with_id("abc3", "Three")),
            ]);
            assert_eq!(tree.find_by_id_prefix("abc").len(), 2);
            assert_eq!(tree.find_by_id_prefix("abd").len(), 1);
            assert!(tree.find_by_id_prefix("x").is_empty());
        }
    }

    mod insert_tests {
        use super::*;

        #[test]
        fn test_child_inherits_parent_schedule() {
            let tree = TaskTree::from_roots(vec![
                TaskNode::with_id("p", "Parent").scheduled_on(day("2024-06-01"))
            ]);
            let (tree, new_id) = tree.insert_child(&id("p"), day("2024-07-01"), day("2024-05-01"));
            let new_id = new_id.unwrap();
            let child = tree.find(&new_id).unwrap();
            assert_eq!(child.text, "");
            assert_eq!(child.scheduled_date, Some(day("2024-06-01")));
            assert_eq!(tree.parent_of(&new_id).map(|n| n.id.clone()), Some(id("p")));
        }

        #[test]
        fn test_child_takes_future_selected_date_only() {
            let tree = TaskTree::from_roots(vec![TaskNode::with_id("p", "Parent")]);
            let today = day("2024-05-01");

            let (with_future, child) = tree.insert_child(&id("p"), day("2024-05-03"), today);
            assert_eq!(
                with_future.find(&child.unwrap()).unwrap().scheduled_date,
                Some(day("2024-05-03"))
            );

            let (with_today, child) = tree.insert_child(&id("p"), today, today);
            assert_eq!(with_today.find(&child.unwrap()).unwrap().scheduled_date, None);

            let (with_past, child) = tree.insert_child(&id("p"), day("2024-04-01"), today);
            assert_eq!(with_past.find(&child.unwrap()).unwrap().scheduled_date, None);
        }

        #[test]
        fn test_appends_after_existing_children() {
            let (tree, new_id) = sample_tree().insert_child(&id("a"), day("2024-01-01"), day("2024-01-01"));
            let a = tree.find(&id("a")).unwrap();
            assert_eq!(a.children.len(), 3);
            assert_eq!(a.children[2].id, new_id.unwrap());
        }

        #[test]
        fn test_unknown_parent_is_noop() {
            let tree = sample_tree();
            let (after, new_id) = tree.insert_child(&id("nope"), day("2024-01-01"), day("2024-01-01"));
            assert!(new_id.is_none());
            assert_eq!(after, tree);
        }

        #[test]
        fn test_insert_root() {
            let (tree, new_id) = sample_tree().insert_root(day("2024-01-05"), day("2024-01-01"));
            assert_eq!(tree.roots().len(), 3);
            assert_eq!(tree.roots()[2].id, new_id);
            assert_eq!(tree.roots()[2].scheduled_date, Some(day("2024-01-05")));
        }
    }

    mod delete_tests {
        use super::*;

        #[test]
        fn test_removes_whole_subtree() {
            let tree = sample_tree().delete_subtree(&id("b"));
            assert_eq!(tree.len(), 3);
            assert!(!tree.contains(&id("b")));
            assert!(!tree.contains(&id("c")));
            assert!(tree.contains(&id("d")));
        }

        #[test]
        fn test_does_not_touch_input() {
            let tree = sample_tree();
            let _ = tree.delete_subtree(&id("a"));
            assert_eq!(tree, sample_tree());
        }

        #[test]
        fn test_unknown_id_is_noop() {
            assert_eq!(sample_tree().delete_subtree(&id("zz")), sample_tree());
        }
    }

    mod move_tests {
        use super::*;

        #[test]
        fn test_move_under_new_parent_as_last_child() {
            let tree = sample_tree().move_node(&id("b"), Some(&id("e")));
            assert_eq!(
                layout(&tree),
                vec![
                    (0, "a".to_string()),
                    (1, "d".to_string()),
                    (0, "e".to_string()),
                    (1, "b".to_string()),
                    (2, "c".to_string()),
                ]
            );
        }

        #[test]
        fn test_move_to_root() {
            let tree = sample_tree().move_node(&id("c"), None);
            assert_eq!(tree.roots().len(), 3);
            assert_eq!(tree.roots()[2].id, id("c"));
            assert!(tree.find(&id("b")).unwrap().children.is_empty());
        }

        #[test]
        fn test_rejected_moves_leave_tree_unchanged() {
            let tree = sample_tree();
            assert_eq!(tree.move_node(&id("a"), Some(&id("a"))), tree);
            assert_eq!(tree.move_node(&id("a"), Some(&id("c"))), tree);
            assert_eq!(tree.move_node(&id("c"), Some(&id("b"))), tree);
            assert_eq!(tree.move_node(&id("e"), None), tree);
            assert_eq!(tree.move_node(&id("zz"), None), tree);
            assert_eq!(tree.move_node(&id("c"), Some(&id("zz"))), tree);
        }

        #[test]
        fn test_check_move_reasons() {
            let tree = sample_tree();
            assert!(matches!(
                tree.check_move(&id("a"), Some(&id("c"))),
                Err(CoreError::CircularMove(_, _))
            ));
            assert!(matches!(
                tree.check_move(&id("b"), Some(&id("b"))),
                Err(CoreError::CircularMove(_, _))
            ));
            assert!(matches!(tree.check_move(&id("d"), Some(&id("a"))), Err(CoreError::NoOpMove(_))));
            assert!(matches!(tree.check_move(&id("zz"), None), Err(CoreError::NotFound(_))));
            assert!(matches!(
                tree.check_move(&id("d"), Some(&id("zz"))),
                Err(CoreError::NotFound(_))
            ));
            assert!(tree.check_move(&id("d"), Some(&id("c"))).is_ok());
            assert!(tree.check_move(&id("d"), None).is_ok());
        }
    }

    mod update_tests {
        use super::*;

        #[test]
        fn test_update_text_schedule_and_fields() {
            let update = TaskUpdate {
                text: Some("Renamed".to_string()),
                scheduled_date: Some(Some(day("2024-02-02"))),
                set_fields: vec![Field {
                    key: "where".to_string(),
                    value: "home".to_string(),
                }],
                ..Default::default()
            };
            let tree = sample_tree().update_task(&id("c"), update, None, day("2024-01-01"));
            let c = tree.find(&id("c")).unwrap();
            assert_eq!(c.text, "Renamed");
            assert_eq!(c.scheduled_date, Some(day("2024-02-02")));
            assert_eq!(c.field("where"), Some("home"));

            let cleared = tree.update_task(
                &id("c"),
                TaskUpdate {
                    scheduled_date: Some(None),
                    remove_fields: vec!["where".to_string()],
                    ..Default::default()
                },
                None,
                day("2024-01-01"),
            );
            let c = cleared.find(&id("c")).unwrap();
            assert_eq!(c.scheduled_date, None);
            assert!(c.fields.is_empty());
        }

        #[test]
        fn test_attach_and_detach_recurrence() {
            let attach = TaskUpdate {
                recurrence: Some(Some(Recurrence::daily(0))),
                ..Default::default()
            };
            let tree = sample_tree().update_task(&id("d"), attach, Some(day("2024-03-03")), day("2024-03-01"));
            let d = tree.find(&id("d")).unwrap();
            assert_eq!(d.recurrence().map(Recurrence::interval), Some(1));
            assert_eq!(d.anchor(), Some(day("2024-03-03")));

            let detach = TaskUpdate {
                recurrence: Some(None),
                ..Default::default()
            };
            let tree = tree.update_task(&id("d"), detach, None, day("2024-03-01"));
            assert!(!tree.find(&id("d")).unwrap().is_recurring());
        }

        #[test]
        fn test_unknown_id_is_noop() {
            let update = TaskUpdate {
                text: Some("x".to_string()),
                ..Default::default()
            };
            assert_eq!(
                sample_tree().update_task(&id("zz"), update, None, day("2024-01-01")),
                sample_tree()
            );
        }
    }

    mod completion_tests {
        use super::*;

        fn habit_tree() -> TaskTree {
            TaskTree::from_roots(vec![TaskNode::with_id("h", "Habit")
                .scheduled_on(day("2024-01-01"))
                .with_recurrence(Recurrence::weekly(1, [1, 3].into_iter().collect()))])
        }

        #[test]
        fn test_completing_occurrence_advances_schedule() {
            let tree = habit_tree().toggle_completion(&id("h"), true, day("2024-01-01"));
            let habit = tree.find(&id("h")).unwrap();
            assert!(habit.is_completed_on(day("2024-01-01")));
            assert_eq!(habit.scheduled_date, Some(day("2024-01-03")));
        }

        #[test]
        fn test_late_completion_catches_up() {
            let tree = habit_tree().toggle_completion(&id("h"), true, day("2024-01-16"));
            assert_eq!(tree.find(&id("h")).unwrap().scheduled_date, Some(day("2024-01-17")));
        }

        #[test]
        fn test_reopening_does_not_move_schedule() {
            let tree = habit_tree()
                .toggle_completion(&id("h"), true, day("2024-01-01"))
                .toggle_completion(&id("h"), false, day("2024-01-01"));
            let habit = tree.find(&id("h")).unwrap();
            assert!(!habit.is_completed_on(day("2024-01-01")));
            assert_eq!(habit.scheduled_date, Some(day("2024-01-03")));
        }

        #[test]
        fn test_completing_before_anchor_does_not_advance() {
            let tree = habit_tree()
                .toggle_completion(&id("h"), true, day("2024-01-01"))
                .toggle_completion(&id("h"), true, day("2024-01-01"));
            assert_eq!(tree.find(&id("h")).unwrap().scheduled_date, Some(day("2024-01-03")));
        }

        #[test]
        fn test_one_shot_toggle() {
            let tree = sample_tree().toggle_completion(&id("c"), true, day("2024-01-09"));
            let c = tree.find(&id("c")).unwrap();
            assert_eq!(
                c.kind,
                TaskKind::OneShot {
                    is_completed: true,
                    completion_date: Some(day("2024-01-09"))
                }
            );
            let tree = tree.toggle_completion(&id("c"), false, day("2024-01-09"));
            assert_eq!(tree, sample_tree());
        }
    }

    #[test]
    fn test_serializes_as_array_and_strips_annotations() {
        let mut tree = sample_tree();
        tree.roots[0].original_child_count = Some(7);
        let json = serde_json::to_value(tree.without_annotations()).unwrap();
        assert!(json.is_array());
        assert!(json[0].get("originalChildCount").is_none());
        let back: TaskTree = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_tree());
    }
}
