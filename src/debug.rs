use core::ptr::NonNull;
use std::{collections::VecDeque, fmt};

use crate::{AvlTree, Dir, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>>,
{
    /// Writes the tree in Graphviz `dot` format.
    ///
    /// Nodes are labelled `key:balance` and laid out one rank per tree level. Missing children
    /// are drawn as points so left and right stay distinguishable.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        writeln!(w, "digraph \"{name}\" {{")?;

        let mut level = VecDeque::new();
        level.extend(self.root);

        let mut edges = String::new();
        let mut missing = 0;

        while !level.is_empty() {
            w.write_str("  { rank=same;")?;

            for _ in 0..level.len() {
                let Some(node) = level.pop_front() else {
                    break;
                };

                let id = Self::dot_id(node);
                let (key, balance) = unsafe { (node.as_ref().key(), self.links(node).balance()) };
                write!(w, " {id} [label=\"{key:?}:{balance}\"];")?;

                for dir in [Dir::Left, Dir::Right] {
                    use fmt::Write;

                    match unsafe { self.links(node).child(dir) } {
                        Some(child) => {
                            writeln!(edges, "  {id} -> {};", Self::dot_id(child))?;
                            level.push_back(child);
                        }

                        None => {
                            writeln!(edges, "  missing{missing} [shape=point];")?;
                            writeln!(edges, "  {id} -> missing{missing};")?;
                            missing += 1;
                        }
                    }
                }
            }

            w.write_str(" }\n")?;
        }

        w.write_str(&edges)?;
        w.write_str("}\n")
    }

    fn dot_id(node: NonNull<T>) -> String {
        format!("n{:x}", node.as_ptr() as usize)
    }
}
