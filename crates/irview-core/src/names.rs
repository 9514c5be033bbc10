//! Compiler class-name helpers.
//!
//! Node classes arrive as fully qualified JVM-style names such as
//! `com.oracle.truffle.sl.nodes.SLAddNodeGen` or nested types like
//! `...SLLiterals$IntLiteralNode`. Passes and summaries work on the simple
//! name with generated-code suffixes stripped: the code-generation suffix
//! `Gen` first, then the generic `Node` suffix.

/// Returns the segment after the last `.`.
pub fn simple_name(class_name: &str) -> &str {
    class_name.rsplit('.').next().unwrap_or(class_name)
}

/// Returns the trailing nested-type segment (after the last `$`), or the
/// whole simple name when the class is not nested.
pub fn nested_segment(class_name: &str) -> &str {
    let simple = simple_name(class_name);
    simple.rsplit('$').next().unwrap_or(simple)
}

/// True when the class follows the nested-type naming convention.
pub fn is_nested(class_name: &str) -> bool {
    simple_name(class_name).contains('$')
}

/// Strips the `Gen` suffix, then the `Node` suffix, from a name segment.
pub fn strip_generated_suffixes(segment: &str) -> &str {
    let segment = segment.strip_suffix("Gen").unwrap_or(segment);
    segment.strip_suffix("Node").unwrap_or(segment)
}

/// Simple name with nesting and generated suffixes removed; the default
/// label and pattern-matching form of a node class.
pub fn stripped_name(class_name: &str) -> &str {
    strip_generated_suffixes(nested_segment(class_name))
}

/// Parses an indexed-slot name like `arguments[3]` against `prefix`
/// (`"arguments"`), returning the index.
pub fn indexed_slot(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_takes_last_segment() {
        assert_eq!(simple_name("a.b.CNode"), "CNode");
        assert_eq!(simple_name("CNode"), "CNode");
    }

    #[test]
    fn nested_segment_takes_after_dollar() {
        assert_eq!(nested_segment("a.b.Outer$IntLiteralNode"), "IntLiteralNode");
        assert_eq!(nested_segment("a.b.Plain"), "Plain");
        assert!(is_nested("a.b.Outer$Inner"));
        assert!(!is_nested("a.b.Plain"));
    }

    #[test]
    fn suffix_stripping_order() {
        assert_eq!(strip_generated_suffixes("AddNodeGen"), "Add");
        assert_eq!(strip_generated_suffixes("AddNode"), "Add");
        assert_eq!(strip_generated_suffixes("Add"), "Add");
        // Gen is stripped before Node, not after.
        assert_eq!(strip_generated_suffixes("AddGenNode"), "AddGen");
    }

    #[test]
    fn stripped_name_combines_both() {
        assert_eq!(stripped_name("x.y.Frames$NewFrameNodeGen"), "NewFrame");
    }

    #[test]
    fn indexed_slot_parsing() {
        assert_eq!(indexed_slot("arguments[0]", "arguments"), Some(0));
        assert_eq!(indexed_slot("arguments[17]", "arguments"), Some(17));
        assert_eq!(indexed_slot("arguments", "arguments"), None);
        assert_eq!(indexed_slot("arguments[x]", "arguments"), None);
        assert_eq!(indexed_slot("slots[2]", "arguments"), None);
    }
}
