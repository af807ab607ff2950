//! ASCII tree rendering for an idea's revisions.

use std::fmt;

use crate::models::VersionNumber;
use crate::store::IdeaTree;

const CURRENT: char = '●';
const OTHER: char = '○';

/// One rendered revision, as produced by [`TreeWalk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine<'a> {
    pub version: VersionNumber,
    pub depth: usize,
    pub title: &'a str,
    pub is_current: bool,
    prefix: String,
    is_last: bool,
}

impl fmt::Display for TreeLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = if self.is_current { CURRENT } else { OTHER };
        if self.depth > 0 {
            let branch = if self.is_last { "└── " } else { "├── " };
            write!(f, "{}{}", self.prefix, branch)?;
        }
        write!(f, "{} v{} {}", symbol, self.version, self.title)
    }
}

struct Frame {
    version: VersionNumber,
    depth: usize,
    prefix: String,
    is_last: bool,
}

/// Pre-order, depth-first iterator over the revision tree.
///
/// Children are visited in append order. Termination relies on the tree
/// being a forest, which [`IdeaTree`] checks on load and keeps on append.
pub struct TreeWalk<'a> {
    tree: &'a IdeaTree,
    stack: Vec<Frame>,
}

impl<'a> TreeWalk<'a> {
    pub fn new(tree: &'a IdeaTree) -> Self {
        Self {
            tree,
            stack: vec![Frame {
                version: tree.root(),
                depth: 0,
                prefix: String::new(),
                is_last: true,
            }],
        }
    }
}

impl<'a> Iterator for TreeWalk<'a> {
    type Item = TreeLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.stack.pop()?;
        let tree = self.tree;

        // Root children start flush left; deeper levels carry the rail.
        let child_prefix = if frame.depth == 0 {
            String::new()
        } else {
            let continuation = if frame.is_last { "    " } else { "│   " };
            format!("{}{}", frame.prefix, continuation)
        };
        let children = tree.children_of(frame.version);
        for (i, child) in children.iter().enumerate().rev() {
            self.stack.push(Frame {
                version: *child,
                depth: frame.depth + 1,
                prefix: child_prefix.clone(),
                is_last: i == children.len() - 1,
            });
        }

        Some(TreeLine {
            version: frame.version,
            depth: frame.depth,
            title: tree.version(frame.version).map_or("", |v| v.title.as_str()),
            is_current: frame.version == tree.current(),
            prefix: frame.prefix,
            is_last: frame.is_last,
        })
    }
}

/// Render the whole tree with a header line.
///
/// Example output:
/// ```text
/// idea_1f2e3d4c (title: Build a rocket)
/// ○ v1 Build a rocket
/// ├── ○ v2 Build a rocket
/// │   └── ● v4 Build a rocket
/// └── ○ v3 Build a rocket
/// ```
pub fn render_tree(tree: &IdeaTree) -> String {
    let mut output = format!("{} (title: {})\n", tree.id(), tree.metadata().title);
    for line in tree.show_tree() {
        output.push_str(&line.to_string());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateIdeaInput, CreateRevisionInput};
    use crate::store::IdeaRepository;

    fn idea(dir: &std::path::Path) -> IdeaTree {
        IdeaRepository::open(dir)
            .unwrap()
            .add(CreateIdeaInput {
                role: "mentor".to_string(),
                task: "Build a rocket".to_string(),
                ..Default::default()
            })
            .unwrap()
    }

    fn revise(tree: &mut IdeaTree, parent: Option<VersionNumber>) {
        tree.revise(CreateRevisionInput {
            parent_id: parent,
            author: "ana".to_string(),
            ..Default::default()
        })
        .unwrap();
    }

    #[test]
    fn test_single_root() {
        let dir = tempfile::tempdir().unwrap();
        let tree = idea(dir.path());
        let lines: Vec<String> = tree.show_tree().map(|l| l.to_string()).collect();
        assert_eq!(lines, vec!["● v1 Build a rocket"]);
    }

    #[test]
    fn test_nested_branches() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = idea(dir.path());
        revise(&mut tree, None); // v2 under v1
        revise(&mut tree, Some(1)); // v3 under v1
        revise(&mut tree, Some(2)); // v4 under v2
        revise(&mut tree, None); // v5 under v4

        let expected = format!(
            "{} (title: Build a rocket)\n\
             ○ v1 Build a rocket\n\
             ├── ○ v2 Build a rocket\n\
             │   └── ○ v4 Build a rocket\n\
             │       └── ● v5 Build a rocket\n\
             └── ○ v3 Build a rocket\n",
            tree.id()
        );
        assert_eq!(render_tree(&tree), expected);
    }

    #[test]
    fn test_walk_is_pre_order_and_visits_each_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = idea(dir.path());
        revise(&mut tree, None);
        revise(&mut tree, Some(1));
        revise(&mut tree, Some(2));

        let order: Vec<_> = tree.show_tree().map(|l| (l.version, l.depth)).collect();
        assert_eq!(order, vec![(1, 0), (2, 1), (4, 2), (3, 1)]);
    }
}
