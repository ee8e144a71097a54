//! Reader for merge files.
//!
//! ```text
//! # name  x  y          or   name  child1  child2
//! L   a   0.5   1.0
//! L   b   2.0   1.0
//! M   ab  a     b
//! ```
//!
//! Records are tab separated. A merge may only name nodes declared above it,
//! each node joins at most one merge, and the last record is the root.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::tree::{ClusterTree, NodeId};

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

struct Reader {
    tree: ClusterTree,
    name_to_id: FxHashMap<String, NodeId>,
    names: Vec<String>,
    declared_at: Vec<usize>,
    merged: Vec<bool>,
}

impl Reader {
    fn new() -> Self {
        Reader {
            tree: ClusterTree::new(),
            name_to_id: FxHashMap::default(),
            names: Vec::new(),
            declared_at: Vec::new(),
            merged: Vec::new(),
        }
    }

    fn child(&mut self, line: usize, name: &str) -> Result<NodeId> {
        let id = *self
            .name_to_id
            .get(name)
            .ok_or_else(|| parse_error(line, format!("unknown node '{}'", name)))?;
        if self.merged[id.index()] {
            return Err(parse_error(line, format!("node '{}' is already part of a merge", name)));
        }
        self.merged[id.index()] = true;
        Ok(id)
    }

    fn declare(&mut self, line: usize, name: &str, id: NodeId) -> Result<()> {
        if self.name_to_id.insert(name.to_string(), id).is_some() {
            return Err(parse_error(line, format!("node '{}' is declared twice", name)));
        }
        self.names.push(name.to_string());
        self.declared_at.push(line);
        self.merged.push(false);
        Ok(())
    }

    fn record(&mut self, line: usize, parts: &[&str]) -> Result<()> {
        match parts {
            ["L", name, x, y] => {
                let x: f64 = x
                    .trim()
                    .parse()
                    .map_err(|_| parse_error(line, format!("bad x coordinate '{}'", x)))?;
                let y: f64 = y
                    .trim()
                    .parse()
                    .map_err(|_| parse_error(line, format!("bad y coordinate '{}'", y)))?;
                let id = self.tree.add_leaf(x, y);
                self.declare(line, name, id)
            }
            ["M", name, child1, child2] => {
                if child1 == child2 {
                    return Err(parse_error(line, format!("node '{}' cannot merge with itself", child1)));
                }
                let child1 = self.child(line, child1)?;
                let child2 = self.child(line, child2)?;
                let id = self.tree.add_merge(child1, child2)?;
                self.declare(line, name, id)
            }
            ["M", name, child] => {
                let child = self.child(line, child)?;
                let id = self.tree.add_unary(child)?;
                self.declare(line, name, id)
            }
            ["L", ..] => Err(parse_error(line, "leaf records are: L <name> <x> <y>")),
            ["M", ..] => Err(parse_error(line, "merge records are: M <name> <child1> [<child2>]")),
            [kind, ..] => Err(parse_error(line, format!("unknown record type '{}'", kind))),
            [] => Ok(()),
        }
    }

    fn finish(self) -> Result<ClusterTree> {
        let root = self.tree.root().ok_or(Error::EmptyTree)?;
        let detached = self
            .merged
            .iter()
            .enumerate()
            .find(|&(i, &merged)| !merged && i != root.index());
        if let Some((i, _)) = detached {
            return Err(parse_error(
                self.declared_at[i],
                format!("node '{}' is not connected to the root '{}'", self.names[i], self.names[root.index()]),
            ));
        }
        Ok(self.tree)
    }
}

pub fn parse_merges<R: BufRead>(reader: R) -> Result<ClusterTree> {
    let mut state = Reader::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').collect();
        state.record(idx + 1, &parts)?;
    }
    state.finish()
}

/// Load a cluster tree from a merge file on disk
pub fn load_merge_file(path: &Path) -> Result<ClusterTree> {
    info!("Loading merge file...");
    let file = File::open(path)?;
    let tree = parse_merges(BufReader::new(file))?;
    let leaves = tree.nodes().filter(|(_, n)| n.is_leaf()).count();
    info!("Found {} nodes, {} leaves", tree.len(), leaves);
    Ok(tree)
}
