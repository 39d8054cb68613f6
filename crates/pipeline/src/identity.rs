//! Hierarchical identity assignment

use repograph_core::node::Node;

/// Replace every whitespace character of a name with `_`
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Id of a child: its parent's id joined with the slug of its name
pub fn child_id(parent_id: &str, name: &str) -> String {
    format!("{parent_id}_{}", slug(name))
}

/// Assign ids to every descendant of `parent`, pre-order.
///
/// Each child's `parent_id` is set to the parent's id at the same time,
/// replacing the parser's placeholder. The parent's own id must already be
/// set. Names containing `_` or `/` can yield ambiguous ids; they are not
/// escaped.
pub fn assign_child_ids(parent: &mut Node) {
    let parent_id = parent.id.clone();
    for child in &mut parent.children {
        child.id = child_id(&parent_id, &child.name);
        child.parent_id = Some(parent_id.clone());
        assign_child_ids(child);
    }
}
