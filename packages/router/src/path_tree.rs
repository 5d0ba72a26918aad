//! A trie over path segments.
//!
//! Patterns are lists of segments. A segment is either
//! - a literal, matched exactly,
//! - a parameter (`:name`), which matches any single segment and binds it to `name`, or
//! - a wildcard (`*`), which matches everything that is left. Anything registered after a
//!   wildcard segment is ignored.
//!
//! Lookups walk all viable branches at once instead of backtracking. At every depth, each live
//! candidate tries its literal child, then its parameter child, then its wildcard child, in that
//! order. When the input is consumed, the first candidate that carries data wins. Literal matches
//! therefore beat parameters, and parameters beat wildcards, *at the depth where the branches
//! split*. There is no global specificity score: between two viable parameterised branches the
//! candidate order decides.

use std::{collections::HashMap, fmt::Debug};

use crate::helpers::Params;

const WILDCARD: &str = "*";

struct PathNode<T> {
    data: Option<T>,
    fixed: HashMap<String, PathNode<T>>,
    parameter: Option<Box<ParameterEdge<T>>>,
    wildcard: Option<Box<PathNode<T>>>,
}

impl<T> Default for PathNode<T> {
    fn default() -> Self {
        Self {
            data: None,
            fixed: HashMap::new(),
            parameter: None,
            wildcard: None,
        }
    }
}

/// The single parameter edge of a node. All `:name` segments at the same position share it.
struct ParameterEdge<T> {
    name: String,
    node: PathNode<T>,
}

struct Candidate<'a, T> {
    node: &'a PathNode<T>,
    params: Params,
    terminal: bool,
}

/// The result of a successful [`PathTree`] lookup.
#[derive(Debug, PartialEq)]
pub struct PathMatch<'a, T> {
    /// The data registered for the matching pattern.
    pub data: &'a T,
    /// The values bound to parameter segments, not decoded.
    pub params: Params,
}

/// Associates data with path patterns and resolves concrete paths against them.
pub struct PathTree<T> {
    root: PathNode<T>,
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self {
            root: PathNode::default(),
        }
    }
}

impl<T> PathTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` for the pattern made of `segments`.
    ///
    /// Registering the same pattern again replaces its data. A `:name` segment renames the
    /// parameter edge it lands on, so the latest registration decides which name the shared edge
    /// binds.
    pub fn add_path<S: AsRef<str>>(&mut self, segments: &[S], data: T) {
        let mut node = &mut self.root;
        for segment in segments {
            let segment = segment.as_ref();
            if segment == WILDCARD {
                node.wildcard = Some(Box::new(PathNode {
                    data: Some(data),
                    ..PathNode::default()
                }));
                return;
            }

            node = match segment.strip_prefix(':') {
                Some(name) => {
                    let edge = node.parameter.get_or_insert_with(|| {
                        Box::new(ParameterEdge {
                            name: name.to_string(),
                            node: PathNode::default(),
                        })
                    });
                    name.clone_into(&mut edge.name);
                    &mut edge.node
                }
                None => node.fixed.entry(segment.to_string()).or_default(),
            };
        }
        node.data = Some(data);
    }

    /// Find the data registered for the pattern matching `segments`, along with the parameter
    /// values bound on the way.
    ///
    /// If a parameter name is bound twice along one branch, the first binding is kept.
    ///
    /// ```rust
    /// # use stack_router::path_tree::PathTree;
    /// let mut tree = PathTree::new();
    /// tree.add_path(&["a", "b", "c"], "abc");
    /// tree.add_path(&["a", ":id", "c", "d"], "a:idcd");
    ///
    /// assert_eq!(tree.get_data_and_params_by_paths(&["a", "b", "c"]).unwrap().data, &"abc");
    ///
    /// let matched = tree.get_data_and_params_by_paths(&["a", "z", "c", "d"]).unwrap();
    /// assert_eq!(matched.data, &"a:idcd");
    /// assert_eq!(matched.params["id"], "z");
    /// ```
    pub fn get_data_and_params_by_paths<S: AsRef<str>>(
        &self,
        segments: &[S],
    ) -> Option<PathMatch<'_, T>> {
        let mut candidates = vec![Candidate {
            node: &self.root,
            params: Params::new(),
            terminal: false,
        }];

        for segment in segments {
            let segment = segment.as_ref();
            let mut next = Vec::with_capacity(candidates.len());

            for candidate in candidates {
                if candidate.terminal {
                    next.push(candidate);
                    break;
                }

                if let Some(child) = candidate.node.fixed.get(segment) {
                    next.push(Candidate {
                        node: child,
                        params: candidate.params.clone(),
                        terminal: false,
                    });
                }

                if let Some(edge) = &candidate.node.parameter {
                    let mut params = candidate.params.clone();
                    params
                        .entry(edge.name.clone())
                        .or_insert_with(|| segment.to_string());
                    next.push(Candidate {
                        node: &edge.node,
                        params,
                        terminal: false,
                    });
                }

                if let Some(wildcard) = &candidate.node.wildcard {
                    next.push(Candidate {
                        node: wildcard,
                        params: candidate.params,
                        terminal: true,
                    });
                }
            }

            if next.is_empty() {
                return None;
            }
            candidates = next;
        }

        candidates.into_iter().find_map(|candidate| {
            candidate.node.data.as_ref().map(|data| PathMatch {
                data,
                params: candidate.params,
            })
        })
    }
}

impl<T: Debug> Debug for PathTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn collect<'a, T>(node: &'a PathNode<T>, prefix: String, out: &mut Vec<(String, &'a T)>) {
            if let Some(data) = &node.data {
                out.push((prefix.clone(), data));
            }
            for (segment, child) in &node.fixed {
                collect(child, format!("{prefix}/{segment}"), out);
            }
            if let Some(edge) = &node.parameter {
                collect(&edge.node, format!("{prefix}/:{}", edge.name), out);
            }
            if let Some(wildcard) = &node.wildcard {
                collect(wildcard, format!("{prefix}/*"), out);
            }
        }

        let mut patterns = Vec::new();
        collect(&self.root, String::new(), &mut patterns);
        patterns.sort_by(|a, b| a.0.cmp(&b.0));
        f.debug_map().entries(patterns).finish()
    }
}
