//! Predicate-based search over parsed HTML trees.
//!
//! These helpers work on `dom_query::NodeRef` directly instead of CSS
//! selections, because timeline markup is matched by position and class
//! membership rather than by stable selectors. Absence is always represented
//! by empty results or empty strings, never by errors: every part of the
//! document is optional until a caller decides otherwise.

use dom_query::NodeRef;

use crate::patterns::WHITESPACE_NORMALIZE;

/// Elements that introduce a visual break between words.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "div", "dl", "dt", "dd", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Returns all nodes under `root` (inclusive) matching `pred`, in document
/// order.
///
/// Matched subtrees are atomic: once a node matches, its descendants are not
/// visited. This keeps nested structures (a quoted post inside a post, say)
/// from being picked up twice when they share a class with their ancestor.
pub fn find_all<'a>(root: &NodeRef<'a>, pred: &dyn Fn(&NodeRef<'a>) -> bool) -> Vec<NodeRef<'a>> {
    let mut found = Vec::new();
    collect(root, pred, &mut found);
    found
}

fn collect<'a>(node: &NodeRef<'a>, pred: &dyn Fn(&NodeRef<'a>) -> bool, found: &mut Vec<NodeRef<'a>>) {
    if pred(node) {
        found.push(node.clone());
        return;
    }
    let mut child = node.first_child();
    while let Some(c) = child {
        child = c.next_sibling();
        collect(&c, pred, found);
    }
}

/// Returns the first node under `root` (inclusive) matching `pred`,
/// descending into non-matching nodes.
pub fn find_first<'a>(root: &NodeRef<'a>, pred: &dyn Fn(&NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
    if pred(root) {
        return Some(root.clone());
    }
    let mut child = root.first_child();
    while let Some(c) = child {
        child = c.next_sibling();
        if let Some(hit) = find_first(&c, pred) {
            return Some(hit);
        }
    }
    None
}

/// True if `node` is an HTML element with the given tag name.
pub fn is_element(node: &NodeRef, tag: &str) -> bool {
    node.is_element() && node.node_name().is_some_and(|n| &*n == tag)
}

/// Returns the value of the named attribute, or `None` when absent.
pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    node.attrs()
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
}

/// True if the named attribute is present, with any value.
pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    get_attr(node, name).is_some()
}

/// True if the named attribute is present and equals `value`.
pub fn attr_equals(node: &NodeRef, name: &str, value: &str) -> bool {
    get_attr(node, name).as_deref() == Some(value)
}

/// True if `node`'s class list contains `class`.
///
/// Checks membership in the whitespace-separated list, not substring
/// containment: `"tweet-reply"` does not match class `"tweet"`.
pub fn has_class(node: &NodeRef, class: &str) -> bool {
    get_attr(node, "class")
        .map(|v| v.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Convenience matcher for "element with this tag and this class".
/// An empty tag or class skips that half of the check.
pub fn matcher<'a>(tag: &'a str, class: &'a str) -> impl Fn(&NodeRef) -> bool + 'a {
    move |n: &NodeRef| {
        if !tag.is_empty() && !is_element(n, tag) {
            return false;
        }
        if !class.is_empty() && !has_class(n, class) {
            return false;
        }
        n.is_element()
    }
}

/// Concatenates all text content in and under `node`.
///
/// With `block_separators` set, a single space is inserted at the boundary of
/// every block-level element so words from adjacent blocks don't run
/// together. Callers still trim and collapse with [`clean_text`].
pub fn node_text(node: &NodeRef, block_separators: bool) -> String {
    let mut out = String::new();
    append_text(node, block_separators, &mut out);
    out
}

fn append_text(node: &NodeRef, block_separators: bool, out: &mut String) {
    if node.is_text() {
        out.push_str(&node.text());
        return;
    }
    let block = block_separators
        && node.is_element()
        && node.node_name().is_some_and(|n| BLOCK_TAGS.contains(&&*n));
    if block {
        push_boundary_space(out);
    }
    let mut child = node.first_child();
    while let Some(c) = child {
        child = c.next_sibling();
        append_text(&c, block_separators, out);
    }
    if block {
        push_boundary_space(out);
    }
}

fn push_boundary_space(out: &mut String) {
    if !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
}

/// Trims `s` and collapses internal whitespace runs to single spaces.
pub fn clean_text(s: &str) -> String {
    WHITESPACE_NORMALIZE.replace_all(s.trim(), " ").to_string()
}

/// Element children of `node`, skipping text and comment nodes.
pub fn element_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut out = Vec::new();
    let mut child = node.first_child();
    while let Some(c) = child {
        child = c.next_sibling();
        if c.is_element() {
            out.push(c);
        }
    }
    out
}

/// Strips the named attribute from every element in the subtree.
pub fn remove_attr_recursive(root: &NodeRef, name: &str) {
    if root.is_element() && has_attr(root, name) {
        dom_query::Selection::from(root.clone()).remove_attr(name);
    }
    let mut child = root.first_child();
    while let Some(c) = child {
        child = c.next_sibling();
        remove_attr_recursive(&c, name);
    }
}
