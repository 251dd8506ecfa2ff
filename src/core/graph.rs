use crate::core::types::ThreadId;
use fxhash::FxHashMap;
use std::collections::VecDeque;
use std::fmt::Write;

/// A single vertex of the wait-for graph
#[derive(Debug, Default, Clone)]
struct Vertex {
    /// Number of edges pointing at this vertex (parallel edges count once each)
    indegree: usize,
    /// Out-neighbors, in insertion order, duplicates preserved
    neighbors: Vec<ThreadId>,
}

/// Represents a directed graph of thread wait relationships
///
/// Vertices are thread ids; an edge `a -> b` means thread `a` is blocked
/// waiting for a lock currently held by thread `b`. The graph is a
/// multigraph: repeated `add_edge` calls with the same endpoints add
/// parallel edges and inflate the target's indegree accordingly. It is
/// rebuilt from a table snapshot on every detection pass and emptied only
/// via [`clear`](WaitForGraph::clear).
pub struct WaitForGraph {
    vertices: FxHashMap<ThreadId, Vertex>,
}

impl Default for WaitForGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitForGraph {
    /// Create a new empty wait-for graph
    pub fn new() -> Self {
        WaitForGraph {
            vertices: FxHashMap::default(),
        }
    }

    /// Add a directed edge: `from` thread waits for `to` thread
    ///
    /// Either endpoint is created on demand with indegree 0 and no
    /// out-neighbors. A self-edge is legal and forms a one-vertex cycle.
    pub fn add_edge(&mut self, from: ThreadId, to: ThreadId) {
        self.vertices.entry(from).or_default().neighbors.push(to);
        self.vertices.entry(to).or_default().indegree += 1;
    }

    /// Remove all vertices and edges
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Decide whether the graph contains at least one directed cycle
    ///
    /// Runs Kahn's topological reduction: repeatedly strip vertices whose
    /// working indegree is zero; anything left unstripped lies on a cycle
    /// or is reachable from one. Linear in `|V| + |E|`, no recursion.
    pub fn has_cycle(&self) -> bool {
        !self.unreduced_vertices().is_empty()
    }

    /// The vertices the topological reduction could not strip, sorted
    ///
    /// Under the hook protocol each thread has at most one outgoing edge,
    /// so this set is exactly the union of all cycles.
    pub fn cycle_participants(&self) -> Vec<ThreadId> {
        let mut participants = self.unreduced_vertices();
        participants.sort_unstable();
        participants
    }

    /// Enumerate all vertices, in unspecified order
    pub fn nodes(&self) -> Vec<ThreadId> {
        self.vertices.keys().copied().collect()
    }

    /// Number of vertices currently in the graph
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the graph holds no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Kahn's algorithm; returns the vertices never reaching indegree zero
    fn unreduced_vertices(&self) -> Vec<ThreadId> {
        if self.vertices.is_empty() {
            return Vec::new();
        }

        // Working copy of the indegrees; the reduction consumes it
        let mut indegree: FxHashMap<ThreadId, usize> = self
            .vertices
            .iter()
            .map(|(&id, v)| (id, v.indegree))
            .collect();

        let mut queue: VecDeque<ThreadId> = indegree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut processed = 0usize;
        while let Some(node) = queue.pop_front() {
            processed += 1;
            for &neighbor in &self.vertices[&node].neighbors {
                let deg = indegree
                    .get_mut(&neighbor)
                    .expect("edge target must have a vertex entry");
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(neighbor);
                }
            }
        }

        if processed == self.vertices.len() {
            return Vec::new();
        }

        indegree
            .into_iter()
            .filter(|&(_, deg)| deg > 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Print the diagnostic rendering to stdout
    pub fn print_graph(&self) {
        print!("{}", self.render());
    }

    /// Diagnostic rendering of vertices with indegrees and out-neighbors
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "========== Graph Structure ==========");
        let _ = writeln!(out, "Total nodes: {}", self.vertices.len());

        let mut ids: Vec<ThreadId> = self.vertices.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let vertex = &self.vertices[&id];
            let _ = write!(out, "Thread {id} (indegree={})", vertex.indegree);
            if !vertex.neighbors.is_empty() {
                let neighbors: Vec<String> =
                    vertex.neighbors.iter().map(|n| n.to_string()).collect();
                let _ = write!(out, " -> [{}]", neighbors.join(", "));
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "=====================================");
        out
    }
}
