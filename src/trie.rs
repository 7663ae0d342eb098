//! Token trie for continuation lookup.
//!
//! All observed token sequences are deep-merged into one prefix tree.
//! Nodes live in an arena (`Vec` indexed by `NodeId`) rather than as
//! boxed recursive maps; each node keeps its children both in a hash map
//! for O(1) descent and in an insertion-order list so continuation
//! enumeration has a stable, documented order.
//!
//! Merging is additive and order-independent: any insertion order of the
//! same sequence set produces the same trie. Chunked building exists
//! purely to pace memory, never for correctness.

use std::collections::HashMap;

use crate::tokenizer::{Sequence, Token};

/// Index of a node in the trie arena.
pub type NodeId = usize;

/// Sequences merged per chunk during a bulk build.
pub const MERGE_CHUNK_SIZE: usize = 50_000;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<Token, NodeId>,
    order: Vec<Token>,
}

/// Prefix tree over observed token sequences.
#[derive(Debug, Clone)]
pub struct TokenTrie {
    nodes: Vec<TrieNode>,
}

impl Default for TokenTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenTrie {
    /// Creates a trie holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Build a trie from sequences, merging in bounded chunks.
    #[must_use]
    pub fn from_sequences(sequences: &[Sequence]) -> Self {
        Self::from_sequences_chunked(sequences, MERGE_CHUNK_SIZE)
    }

    /// Build with an explicit chunk size (zero means one chunk).
    #[must_use]
    pub fn from_sequences_chunked(sequences: &[Sequence], chunk_size: usize) -> Self {
        let mut trie = Self::new();
        let chunk_size = if chunk_size == 0 {
            sequences.len().max(1)
        } else {
            chunk_size
        };
        for chunk in sequences.chunks(chunk_size) {
            for sequence in chunk {
                trie.insert_sequence(sequence);
            }
        }
        trie
    }

    /// Deep-merge one linear token chain into the trie.
    pub fn insert_sequence(&mut self, tokens: &[Token]) {
        let mut node = 0;
        for token in tokens {
            let existing = self.nodes[node].children.get(token).copied();
            node = match existing {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(token.clone(), child);
                    self.nodes[node].order.push(token.clone());
                    child
                }
            };
        }
    }

    /// Walk the trie one level per prefix token.
    ///
    /// Returns the continuation tokens at that depth in insertion order,
    /// or an empty slice when the exact path was never observed. This is
    /// the core read path: O(prefix length), never a partial match.
    #[must_use]
    pub fn lookup(&self, prefix: &[Token]) -> &[Token] {
        let mut node = 0;
        for token in prefix {
            match self.nodes[node].children.get(token) {
                Some(&child) => node = child,
                None => return &[],
            }
        }
        &self.nodes[node].order
    }

    /// True when the exact prefix path exists.
    #[must_use]
    pub fn contains_prefix(&self, prefix: &[Token]) -> bool {
        let mut node = 0;
        for token in prefix {
            match self.nodes[node].children.get(token) {
                Some(&child) => node = child,
                None => return false,
            }
        }
        true
    }

    /// Total number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tokens: &[&str]) -> Sequence {
        tokens.iter().map(ToString::to_string).collect()
    }

    fn toks(tokens: &[&str]) -> Vec<Token> {
        seq(tokens)
    }

    #[test]
    fn lookup_returns_observed_continuations() {
        let trie = TokenTrie::from_sequences(&[
            seq(&["The", "cat", "sat"]),
            seq(&["The", "cat", "ran"]),
            seq(&["The", "dog", "sat"]),
        ]);
        assert_eq!(trie.lookup(&toks(&["The"])), toks(&["cat", "dog"]));
        assert_eq!(trie.lookup(&toks(&["The", "cat"])), toks(&["sat", "ran"]));
    }

    #[test]
    fn unseen_path_is_not_found() {
        let trie = TokenTrie::from_sequences(&[seq(&["The", "cat", "sat"])]);
        assert!(trie.lookup(&toks(&["The", "dog"])).is_empty());
        assert!(trie.lookup(&toks(&["zzzzz"])).is_empty());
        assert!(!trie.contains_prefix(&toks(&["cat", "The"])));
    }

    #[test]
    fn empty_prefix_yields_root_tokens() {
        let trie = TokenTrie::from_sequences(&[seq(&["A", "b"]), seq(&["C", "d"])]);
        assert_eq!(trie.lookup(&[]), toks(&["A", "C"]));
    }

    #[test]
    fn merge_is_order_independent() {
        let forward = TokenTrie::from_sequences(&[
            seq(&["a", "b", "c"]),
            seq(&["a", "b", "d"]),
            seq(&["a", "e"]),
        ]);
        let reversed = TokenTrie::from_sequences(&[
            seq(&["a", "e"]),
            seq(&["a", "b", "d"]),
            seq(&["a", "b", "c"]),
        ]);
        // Same reachable paths either way; only sibling order differs.
        assert_eq!(forward.node_count(), reversed.node_count());
        for prefix in [toks(&["a"]), toks(&["a", "b"]), toks(&["a", "e"])] {
            let mut f: Vec<Token> = forward.lookup(&prefix).to_vec();
            let mut r: Vec<Token> = reversed.lookup(&prefix).to_vec();
            f.sort();
            r.sort();
            assert_eq!(f, r);
        }
    }

    #[test]
    fn chunked_build_equals_unchunked() {
        let sequences: Vec<Sequence> = (0..100)
            .map(|i| seq(&["tok", &format!("n{i}"), "end"]))
            .collect();
        let chunked = TokenTrie::from_sequences_chunked(&sequences, 7);
        let whole = TokenTrie::from_sequences_chunked(&sequences, 0);
        assert_eq!(chunked.node_count(), whole.node_count());
        assert_eq!(
            chunked.lookup(&toks(&["tok"])),
            whole.lookup(&toks(&["tok"]))
        );
    }

    #[test]
    fn duplicate_sequences_do_not_grow_the_trie() {
        let mut trie = TokenTrie::new();
        trie.insert_sequence(&toks(&["a", "b"]));
        let count = trie.node_count();
        trie.insert_sequence(&toks(&["a", "b"]));
        assert_eq!(trie.node_count(), count);
    }
}
