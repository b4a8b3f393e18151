//! Tagged-node lookup over a parsed scene document.
//!
//! The document arrives as a generic roxmltree DOM; everything here queries
//! it by namespace-stripped local tag name. Lookups that the pipeline
//! requires return [`ConvertError`] with the full tag path on failure.

use roxmltree::Node;

use crate::error::ConvertError;

/// Full tag path of a node, e.g. `COLLADA/library_geometries/mesh`.
pub fn node_path(node: Node) -> String {
    let mut tags: Vec<&str> = node
        .ancestors()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name())
        .collect();
    tags.reverse();
    tags.join("/")
}

/// First child element with the given local tag name.
pub fn child<'a, 'input>(of: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    of.children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
}

/// Like [`child`], but a missing child is a fatal conversion error.
pub fn require_child<'a, 'input>(
    of: Node<'a, 'input>,
    tag: &str,
) -> Result<Node<'a, 'input>, ConvertError> {
    child(of, tag).ok_or_else(|| ConvertError::MissingNode {
        path: node_path(of),
        tag: tag.to_string(),
    })
}

/// Follow a path of tag names, requiring each step.
pub fn walk<'a, 'input>(
    of: Node<'a, 'input>,
    path: &[&str],
) -> Result<Node<'a, 'input>, ConvertError> {
    let mut node = of;
    for tag in path {
        node = require_child(node, tag)?;
    }
    Ok(node)
}

/// First child element whose `id` attribute ends with `suffix`. Sources in
/// the documents we consume are identified only by these id suffixes.
pub fn source_ending<'a, 'input>(
    of: Node<'a, 'input>,
    suffix: &str,
) -> Option<Node<'a, 'input>> {
    of.children().find(|c| {
        c.is_element()
            && c.attribute("id")
                .is_some_and(|id| id.ends_with(suffix))
    })
}

/// Like [`source_ending`], but missing is fatal.
pub fn require_source<'a, 'input>(
    of: Node<'a, 'input>,
    suffix: &'static str,
) -> Result<Node<'a, 'input>, ConvertError> {
    source_ending(of, suffix).ok_or_else(|| ConvertError::MissingSource {
        path: node_path(of),
        suffix,
    })
}

/// A required attribute on a node.
pub fn attribute<'a>(node: Node<'a, '_>, name: &'static str) -> Result<&'a str, ConvertError> {
    node.attribute(name)
        .ok_or_else(|| ConvertError::MissingAttribute {
            path: node_path(node),
            attribute: name,
        })
}

/// Parse a node's whitespace-separated text content as floats.
pub fn parse_floats(node: Node) -> Result<Vec<f32>, ConvertError> {
    node.text()
        .unwrap_or("")
        .split_whitespace()
        .map(|token| {
            token.parse::<f32>().map_err(|_| ConvertError::InvalidNumber {
                path: node_path(node),
                token: token.to_string(),
            })
        })
        .collect()
}

/// Parse a node's whitespace-separated text content as unsigned integers.
pub fn parse_ints(node: Node) -> Result<Vec<u32>, ConvertError> {
    node.text()
        .unwrap_or("")
        .split_whitespace()
        .map(|token| {
            token.parse::<u32>().map_err(|_| ConvertError::InvalidNumber {
                path: node_path(node),
                token: token.to_string(),
            })
        })
        .collect()
}

/// The `float_array` payload of a source node.
pub fn float_array(of: Node) -> Result<Vec<f32>, ConvertError> {
    parse_floats(require_child(of, "float_array")?)
}

/// The `Name_array` payload of a source node.
pub fn name_array(of: Node) -> Result<Vec<String>, ConvertError> {
    let names = require_child(of, "Name_array")?;
    Ok(names
        .text()
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_string)
        .collect())
}
