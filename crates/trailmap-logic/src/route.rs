//! Route search over the undirected path graph.
//!
//! `RouteGraph` holds an ordered adjacency list built from map edges and
//! provides BFS reachability plus a longest-simple-path search used to pick
//! the adventure route.
//!
//! The longest-path search is an exhaustive DFS with a shared visited set
//! (marked on entry, cleared on backtrack). It is exponential, so it runs
//! against a frame budget. When the budget runs out the best path found so far
//! is compared against a cheap baseline and the longer one wins:
//! - untargeted: a greedy walk that always steps to the unvisited neighbour
//!   with the fewest onward options,
//! - targeted: the BFS shortest path, used only if no path to the target was
//!   seen before the budget ran out.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Default frame budget for [`RouteSearch`].
pub const DEFAULT_SEARCH_BUDGET: usize = 60_000;

/// Ordered adjacency list. Ordering keeps the search deterministic.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    adj: BTreeMap<u32, BTreeSet<u32>>,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from undirected edges. Self-loops are dropped.
    pub fn from_edges(edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    /// Register a node even if it has no edges yet.
    pub fn add_node(&mut self, id: u32) {
        self.adj.entry(id).or_default();
    }

    pub fn add_edge(&mut self, a: u32, b: u32) {
        if a == b {
            self.add_node(a);
            return;
        }
        self.adj.entry(a).or_default().insert(b);
        self.adj.entry(b).or_default().insert(a);
    }

    pub fn contains(&self, id: u32) -> bool {
        self.adj.contains_key(&id)
    }

    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.adj.get(&a).is_some_and(|n| n.contains(&b))
    }

    pub fn neighbors(&self, id: u32) -> impl Iterator<Item = u32> + '_ {
        self.adj.get(&id).into_iter().flat_map(|n| n.iter().copied())
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Every node reachable from `start`, including `start`.
    pub fn reachable_from(&self, start: u32) -> HashSet<u32> {
        let mut seen = HashSet::new();
        if !self.contains(start) {
            return seen;
        }
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// BFS shortest path, inclusive of both ends.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }
        let mut parent: BTreeMap<u32, u32> = BTreeMap::new();
        let mut queue = VecDeque::new();
        parent.insert(from, from);
        queue.push_back(from);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, current);
                if next == to {
                    let mut path = vec![to];
                    let mut cursor = to;
                    while cursor != from {
                        cursor = parent[&cursor];
                        path.push(cursor);
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Greedy walk from `start`: always move to the unvisited neighbour that
    /// has the fewest unvisited neighbours of its own (lowest id on ties).
    pub fn greedy_walk(&self, start: u32) -> Vec<u32> {
        if !self.contains(start) {
            return Vec::new();
        }
        let mut visited = HashSet::new();
        let mut path = vec![start];
        visited.insert(start);
        let mut current = start;
        loop {
            let mut best: Option<(usize, u32)> = None;
            for next in self.neighbors(current) {
                if visited.contains(&next) {
                    continue;
                }
                let onward = self.neighbors(next).filter(|n| !visited.contains(n)).count();
                if best.map_or(true, |(count, _)| onward < count) {
                    best = Some((onward, next));
                }
            }
            match best {
                Some((_, next)) => {
                    visited.insert(next);
                    path.push(next);
                    current = next;
                }
                None => return path,
            }
        }
    }
}

/// One DFS level: the neighbours of the node on top of the path, and a cursor.
struct Frame {
    neighbors: Vec<u32>,
    next: usize,
}

/// Budgeted longest-simple-path search.
#[derive(Debug, Clone, Copy)]
pub struct RouteSearch {
    pub budget: usize,
}

impl Default for RouteSearch {
    fn default() -> Self {
        Self {
            budget: DEFAULT_SEARCH_BUDGET,
        }
    }
}

impl RouteSearch {
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget: budget.max(1),
        }
    }

    /// Longest simple path starting at `start` and, if given, ending at `target`.
    ///
    /// Returns `None` when `start` is unknown or `target` is unreachable.
    /// The first path reaching the maximum length in traversal order wins.
    pub fn longest_path(
        &self,
        graph: &RouteGraph,
        start: u32,
        target: Option<u32>,
    ) -> Option<Vec<u32>> {
        if !graph.contains(start) {
            return None;
        }
        if target == Some(start) {
            return Some(vec![start]);
        }
        if let Some(t) = target {
            if !graph.contains(t) {
                return None;
            }
        }

        // Nothing can be longer than the component, so stop early on a full cover.
        let component = graph.reachable_from(start).len();

        let mut visited: HashSet<u32> = HashSet::new();
        let mut path: Vec<u32> = vec![start];
        let mut stack = vec![Frame {
            neighbors: graph.neighbors(start).collect(),
            next: 0,
        }];
        visited.insert(start);

        let mut best: Option<Vec<u32>> = if target.is_none() {
            Some(path.clone())
        } else {
            None
        };
        let mut expansions = 1usize;
        let mut exhausted = false;

        while let Some(frame) = stack.last_mut() {
            if best.as_ref().is_some_and(|b| b.len() == component) {
                break;
            }
            if frame.next >= frame.neighbors.len() {
                stack.pop();
                if let Some(done) = path.pop() {
                    visited.remove(&done);
                }
                continue;
            }
            let next = frame.neighbors[frame.next];
            frame.next += 1;
            if visited.contains(&next) {
                continue;
            }
            if expansions >= self.budget {
                exhausted = true;
                break;
            }
            expansions += 1;

            path.push(next);
            if target == Some(next) {
                // A path must end at the target, so never extend through it.
                if best.as_ref().map_or(true, |b| path.len() > b.len()) {
                    best = Some(path.clone());
                }
                path.pop();
                continue;
            }
            if target.is_none() && best.as_ref().map_or(true, |b| path.len() > b.len()) {
                best = Some(path.clone());
            }
            visited.insert(next);
            stack.push(Frame {
                neighbors: graph.neighbors(next).collect(),
                next: 0,
            });
        }

        if !exhausted {
            return best;
        }

        match target {
            Some(t) => best.or_else(|| graph.shortest_path(start, t)),
            None => {
                let greedy = graph.greedy_walk(start);
                match best {
                    Some(b) if b.len() >= greedy.len() => Some(b),
                    _ => Some(greedy),
                }
            }
        }
    }
}

/// Longest simple path with the default budget.
pub fn longest_simple_path(
    graph: &RouteGraph,
    start: u32,
    target: Option<u32>,
) -> Option<Vec<u32>> {
    RouteSearch::default().longest_path(graph, start, target)
}

/// True when `route` has no repeats and every consecutive pair is an edge.
pub fn is_simple_walk(graph: &RouteGraph, route: &[u32]) -> bool {
    let mut seen = HashSet::new();
    if !route.iter().all(|id| seen.insert(*id) && graph.contains(*id)) {
        return false;
    }
    route.windows(2).all(|w| graph.has_edge(w[0], w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> RouteGraph {
        // 1 - 2 - 3 - 4
        RouteGraph::from_edges([(1, 2), (2, 3), (3, 4)])
    }

    fn complete(n: u32) -> RouteGraph {
        let mut edges = Vec::new();
        for a in 0..n {
            for b in (a + 1)..n {
                edges.push((a, b));
            }
        }
        RouteGraph::from_edges(edges)
    }

    #[test]
    fn test_linear_targeted() {
        let path = longest_simple_path(&linear(), 1, Some(4)).unwrap();
        assert_eq!(path, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_start_is_target() {
        assert_eq!(longest_simple_path(&linear(), 2, Some(2)), Some(vec![2]));
    }

    #[test]
    fn test_unknown_start() {
        assert_eq!(longest_simple_path(&linear(), 99, None), None);
    }

    #[test]
    fn test_unreachable_target() {
        let mut graph = linear();
        graph.add_node(9);
        assert_eq!(longest_simple_path(&graph, 1, Some(9)), None);
    }

    #[test]
    fn test_prefers_detour_over_shortcut() {
        //   1 --- 4
        //   |     |
        //   2 --- 3
        // Shortest 1→4 is direct; longest goes around.
        let graph = RouteGraph::from_edges([(1, 4), (1, 2), (2, 3), (3, 4)]);
        let path = longest_simple_path(&graph, 1, Some(4)).unwrap();
        assert_eq!(path, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_untargeted_picks_long_branch() {
        //     1
        //    / \
        //   2   3
        //   |
        //   4
        //   |
        //   5
        let graph = RouteGraph::from_edges([(1, 2), (1, 3), (2, 4), (4, 5)]);
        let path = longest_simple_path(&graph, 1, None).unwrap();
        assert_eq!(path, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_isolated_start_untargeted() {
        let mut graph = RouteGraph::new();
        graph.add_node(7);
        assert_eq!(longest_simple_path(&graph, 7, None), Some(vec![7]));
    }

    #[test]
    fn test_first_maximum_wins() {
        // Two equal-length routes 1→2→4 and 1→3→4; lower ids are explored first.
        let graph = RouteGraph::from_edges([(1, 2), (1, 3), (2, 4), (3, 4)]);
        let path = longest_simple_path(&graph, 1, Some(4)).unwrap();
        assert_eq!(path, vec![1, 2, 4]);
    }

    #[test]
    fn test_complete_graph_covers_everything() {
        let graph = complete(14);
        let path = longest_simple_path(&graph, 0, Some(13)).unwrap();
        assert_eq!(path.len(), 14);
        assert!(is_simple_walk(&graph, &path));
    }

    #[test]
    fn test_budget_never_below_greedy() {
        // A ladder graph is large enough to blow a tiny budget.
        let mut edges = Vec::new();
        for i in 0..12u32 {
            edges.push((i, i + 100));
            if i + 1 < 12 {
                edges.push((i, i + 1));
                edges.push((i + 100, i + 101));
            }
        }
        let graph = RouteGraph::from_edges(edges);
        let greedy = graph.greedy_walk(0);
        let path = RouteSearch::with_budget(5).longest_path(&graph, 0, None).unwrap();
        assert!(path.len() >= greedy.len());
        assert!(is_simple_walk(&graph, &path));
    }

    #[test]
    fn test_budget_targeted_falls_back_to_bfs() {
        let graph = linear();
        let path = RouteSearch::with_budget(1).longest_path(&graph, 1, Some(4)).unwrap();
        assert_eq!(path, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_shortest_path_and_reachability() {
        let graph = RouteGraph::from_edges([(1, 2), (2, 3), (1, 3), (5, 6)]);
        assert_eq!(graph.shortest_path(1, 3), Some(vec![1, 3]));
        assert_eq!(graph.shortest_path(1, 6), None);
        assert_eq!(graph.reachable_from(5).len(), 2);
    }

    #[test]
    fn test_self_loop_dropped() {
        let graph = RouteGraph::from_edges([(1, 1), (1, 2)]);
        assert!(!graph.has_edge(1, 1));
        assert!(graph.has_edge(2, 1));
    }

    #[test]
    fn test_is_simple_walk_rejects_repeats_and_gaps() {
        let graph = linear();
        assert!(is_simple_walk(&graph, &[1, 2, 3]));
        assert!(!is_simple_walk(&graph, &[1, 2, 1]));
        assert!(!is_simple_walk(&graph, &[1, 3]));
        assert!(is_simple_walk(&graph, &[]));
    }
}
