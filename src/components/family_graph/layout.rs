//! Layered top-to-bottom layout over parent/child edges.
//!
//! Phases, per connected component:
//!   1. Cycle breaking (depth-first back edges are reversed)
//!   2. Rank assignment (longest path, roots pulled down to their children)
//!   3. Ordering within ranks (barycenter sweeps, fewest crossings kept)
//!   4. Coordinate assignment (children centred under parents and back)
//!
//! Components are then packed left to right. The result depends only on the
//! inputs and their order, so repeated runs give identical positions.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{DfsEvent, EdgeRef, depth_first_search};

use crate::config::GraphConfig;
use crate::model::{Point, RelationKind, SourceData};

/// Node id to top-left corner of its card.
pub type Positions = HashMap<String, Point>;

/// Parent→child pairs of `source`, oriented ancestor first.
pub fn vertical_pairs(source: &SourceData) -> Vec<(String, String)> {
	source
		.relationships
		.iter()
		.filter_map(|rel| match rel.kind {
			RelationKind::Parent => Some((rel.from.to_string(), rel.to.to_string())),
			RelationKind::Child => Some((rel.to.to_string(), rel.from.to_string())),
			_ => None,
		})
		.collect()
}

/// Ideal positions for every person in `source`, ignoring saved positions.
pub fn layout_source(source: &SourceData, config: &GraphConfig) -> Positions {
	let ids: Vec<String> = source.people.iter().map(|p| p.id.to_string()).collect();
	compute_layout(&ids, &vertical_pairs(source), config)
}

type LayerGraph = DiGraph<(), ()>;

/// Adjacency of an acyclic graph as plain index lists, for the ordering and
/// coordinate phases.
struct Dag {
	succ: Vec<Vec<usize>>,
	pred: Vec<Vec<usize>>,
}

impl Dag {
	fn from_graph(graph: &LayerGraph) -> Self {
		let lists = |dir: Direction| -> Vec<Vec<usize>> {
			graph
				.node_indices()
				.map(|v| graph.neighbors_directed(v, dir).map(NodeIndex::index).collect())
				.collect()
		};
		Self {
			succ: lists(Direction::Outgoing),
			pred: lists(Direction::Incoming),
		}
	}
}

/// Lays out `nodes` using `edges` (ancestor, descendant). Edges naming
/// unknown ids, self-loops and repeats are ignored.
pub fn compute_layout(nodes: &[String], edges: &[(String, String)], config: &GraphConfig) -> Positions {
	let mut ids: Vec<&str> = Vec::with_capacity(nodes.len());
	let mut index: HashMap<&str, usize> = HashMap::new();
	for id in nodes {
		if !index.contains_key(id.as_str()) {
			index.insert(id.as_str(), ids.len());
			ids.push(id.as_str());
		}
	}

	let mut families = UnionFind::<usize>::new(ids.len());
	let mut seen: HashSet<(usize, usize)> = HashSet::new();
	let mut links: Vec<(usize, usize)> = Vec::new();
	for (src, tgt) in edges {
		let (Some(&s), Some(&t)) = (index.get(src.as_str()), index.get(tgt.as_str())) else {
			continue;
		};
		if s == t || !seen.insert((s, t)) {
			continue;
		}
		families.union(s, t);
		links.push((s, t));
	}

	let mut positions = Positions::with_capacity(ids.len());
	let mut cursor = config.margin;
	for members in components(&mut families, ids.len()) {
		let local: HashMap<usize, usize> = members.iter().enumerate().map(|(i, &g)| (g, i)).collect();
		let local_links: Vec<(usize, usize)> = links
			.iter()
			.filter_map(|(s, t)| Some((*local.get(s)?, *local.get(t)?)))
			.collect();

		let xs_ys = layout_component(members.len(), &local_links, config);
		let width = xs_ys.iter().map(|p| p.x).fold(0.0, f64::max) + config.node_width;
		for (i, &g) in members.iter().enumerate() {
			let p = xs_ys[i];
			positions.insert(ids[g].to_string(), Point::new(cursor + p.x, config.margin + p.y));
		}
		cursor += width + config.component_gap;
	}
	positions
}

/// Connected components in order of their first member; members ascending.
fn components(families: &mut UnionFind<usize>, n: usize) -> Vec<Vec<usize>> {
	let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
	let mut out: Vec<Vec<usize>> = Vec::new();
	for v in 0..n {
		let root = families.find_mut(v);
		let slot = *slot_of_root.entry(root).or_insert_with(|| {
			out.push(Vec::new());
			out.len() - 1
		});
		out[slot].push(v);
	}
	out
}

/// Relative card origins for one component, left edge at zero.
fn layout_component(n: usize, links: &[(usize, usize)], config: &GraphConfig) -> Vec<Point> {
	let mut graph = LayerGraph::with_capacity(n, links.len());
	for _ in 0..n {
		graph.add_node(());
	}
	for &(s, t) in links {
		graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
	}

	let acyclic = break_cycles(&graph);
	let rank = assign_ranks(&acyclic);
	let dag = Dag::from_graph(&acyclic);
	let layers = order_layers(&dag, &rank, config.ordering_sweeps);
	let xs = assign_x(&dag, &layers, config);

	let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
	let min_x = if min_x.is_finite() { min_x } else { 0.0 };
	let rank_step = config.node_height + config.rank_sep;
	(0..n)
		.map(|v| Point::new(xs[v] - min_x, rank[v] as f64 * rank_step))
		.collect()
}

/// Reverses every depth-first back edge; repeats collapse into one edge.
fn break_cycles(graph: &LayerGraph) -> LayerGraph {
	let mut back: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
	depth_first_search(graph, graph.node_indices(), |event| {
		if let DfsEvent::BackEdge(u, v) = event {
			back.insert((u, v));
		}
	});

	let mut acyclic = LayerGraph::with_capacity(graph.node_count(), graph.edge_count());
	for _ in graph.node_indices() {
		acyclic.add_node(());
	}
	for edge in graph.edge_references() {
		let (s, t) = (edge.source(), edge.target());
		let (s, t) = if back.contains(&(s, t)) { (t, s) } else { (s, t) };
		if acyclic.find_edge(s, t).is_none() {
			acyclic.add_edge(s, t, ());
		}
	}
	acyclic
}

fn assign_ranks(graph: &LayerGraph) -> Vec<usize> {
	let order: Vec<NodeIndex> = toposort(graph, None).unwrap_or_else(|cycle| {
		log::warn!("Layout graph still cyclic at {:?}", cycle.node_id());
		graph.node_indices().collect()
	});
	let mut rank = vec![0usize; graph.node_count()];
	for &v in &order {
		for w in graph.neighbors(v) {
			rank[w.index()] = rank[w.index()].max(rank[v.index()] + 1);
		}
	}

	// A root that only marries into the tree sits just above its children.
	for &v in order.iter().rev() {
		if graph.neighbors_directed(v, Direction::Incoming).next().is_none() {
			if let Some(lowest_child) = graph.neighbors(v).map(|w| rank[w.index()]).min() {
				rank[v.index()] = lowest_child - 1;
			}
		}
	}

	let min = rank.iter().copied().min().unwrap_or(0);
	rank.iter().map(|r| r - min).collect()
}

fn order_layers(dag: &Dag, rank: &[usize], sweeps: usize) -> Vec<Vec<usize>> {
	let depth = rank.iter().copied().max().map_or(0, |r| r + 1);
	let mut layers: Vec<Vec<usize>> = vec![Vec::new(); depth];
	for (v, &r) in rank.iter().enumerate() {
		layers[r].push(v);
	}

	let mut best = layers.clone();
	let mut best_crossings = count_crossings(dag, rank, &layers);
	for sweep in 0..sweeps {
		if best_crossings == 0 {
			break;
		}
		if sweep % 2 == 0 {
			for r in 1..depth {
				sort_by_barycenter(&mut layers, r, &dag.pred);
			}
		} else {
			for r in (0..depth.saturating_sub(1)).rev() {
				sort_by_barycenter(&mut layers, r, &dag.succ);
			}
		}
		let crossings = count_crossings(dag, rank, &layers);
		if crossings < best_crossings {
			best_crossings = crossings;
			best = layers.clone();
		}
	}
	best
}

fn slot_of(layers: &[Vec<usize>]) -> HashMap<usize, f64> {
	layers
		.iter()
		.flat_map(|layer| layer.iter().enumerate().map(|(i, &v)| (v, i as f64)))
		.collect()
}

fn sort_by_barycenter(layers: &mut [Vec<usize>], r: usize, neighbours: &[Vec<usize>]) {
	let slot = slot_of(layers);
	let mut keyed: Vec<(f64, usize)> = layers[r]
		.iter()
		.map(|&v| {
			let around: Vec<f64> = neighbours[v].iter().filter_map(|w| slot.get(w).copied()).collect();
			let key = if around.is_empty() {
				slot[&v]
			} else {
				around.iter().sum::<f64>() / around.len() as f64
			};
			(key, v)
		})
		.collect();
	keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
	layers[r] = keyed.into_iter().map(|(_, v)| v).collect();
}

fn count_crossings(dag: &Dag, rank: &[usize], layers: &[Vec<usize>]) -> usize {
	let slot = slot_of(layers);
	let mut total = 0;
	for r in 0..layers.len().saturating_sub(1) {
		let mut between: Vec<(f64, f64)> = Vec::new();
		for &v in &layers[r] {
			for &w in &dag.succ[v] {
				if rank[w] == r + 1 {
					between.push((slot[&v], slot[&w]));
				}
			}
		}
		for i in 0..between.len() {
			for j in (i + 1)..between.len() {
				let (a, b) = (between[i], between[j]);
				if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
					total += 1;
				}
			}
		}
	}
	total
}

fn assign_x(dag: &Dag, layers: &[Vec<usize>], config: &GraphConfig) -> Vec<f64> {
	let n = dag.succ.len();
	let step = config.node_width + config.node_sep;
	let mut xs = vec![0.0; n];
	for layer in layers.iter() {
		for (i, &v) in layer.iter().enumerate() {
			xs[v] = i as f64 * step;
		}
	}

	// Children under their parents, then parents over their children.
	for r in 1..layers.len() {
		align_layer(&layers[r], &dag.pred, &mut xs, step);
	}
	for r in (0..layers.len().saturating_sub(1)).rev() {
		align_layer(&layers[r], &dag.succ, &mut xs, step);
	}
	xs
}

/// Moves each node of `layer` toward the mean x of its `neighbours`, keeping
/// order and at least `step` between neighbours in the layer.
fn align_layer(layer: &[usize], neighbours: &[Vec<usize>], xs: &mut [f64], step: f64) {
	if layer.is_empty() {
		return;
	}
	let desired: Vec<f64> = layer
		.iter()
		.map(|&v| {
			let around = &neighbours[v];
			if around.is_empty() {
				xs[v]
			} else {
				around.iter().map(|&w| xs[w]).sum::<f64>() / around.len() as f64
			}
		})
		.collect();

	let mut placed: Vec<f64> = Vec::with_capacity(layer.len());
	for &want in &desired {
		let x = match placed.last() {
			Some(&prev) => want.max(prev + step),
			None => want,
		};
		placed.push(x);
	}
	let shift = desired
		.iter()
		.zip(&placed)
		.map(|(d, p)| d - p)
		.sum::<f64>()
		/ layer.len() as f64;
	for (&v, p) in layer.iter().zip(placed) {
		xs[v] = p + shift;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
		list.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
	}

	fn overlaps(a: Point, b: Point, cfg: &GraphConfig) -> bool {
		(a.x - b.x).abs() < cfg.node_width && (a.y - b.y).abs() < cfg.node_height
	}

	#[test]
	fn test_ancestors_above_descendants() {
		let cfg = GraphConfig::default();
		let pos = compute_layout(
			&ids(&["1", "2", "3", "4"]),
			&pairs(&[("1", "3"), ("2", "3"), ("3", "4")]),
			&cfg,
		);
		assert!(pos["1"].y < pos["3"].y);
		assert!(pos["2"].y < pos["3"].y);
		assert!(pos["3"].y < pos["4"].y);
		assert_eq!(pos["1"].y, pos["2"].y);
	}

	#[test]
	fn test_every_node_positioned_without_overlap() {
		let cfg = GraphConfig::default();
		let nodes = ids(&["1", "2", "3", "4", "5", "6", "7"]);
		let pos = compute_layout(
			&nodes,
			&pairs(&[("1", "2"), ("1", "3"), ("2", "4"), ("3", "5"), ("6", "7")]),
			&cfg,
		);
		assert_eq!(pos.len(), nodes.len());
		for a in &nodes {
			for b in &nodes {
				if a != b {
					assert!(!overlaps(pos[a], pos[b], &cfg), "{a} overlaps {b}");
				}
			}
		}
	}

	#[test]
	fn test_components_do_not_overlap() {
		let cfg = GraphConfig::default();
		let pos = compute_layout(&ids(&["1", "2", "3", "4"]), &pairs(&[("1", "2"), ("3", "4")]), &cfg);
		let left_max = pos["1"].x.max(pos["2"].x) + cfg.node_width;
		let right_min = pos["3"].x.min(pos["4"].x);
		assert!(left_max <= right_min);
	}

	#[test]
	fn test_idempotent() {
		let cfg = GraphConfig::default();
		let nodes = ids(&["5", "1", "9", "3", "7"]);
		let edges = pairs(&[("5", "1"), ("9", "1"), ("1", "3"), ("1", "7")]);
		assert_eq!(compute_layout(&nodes, &edges, &cfg), compute_layout(&nodes, &edges, &cfg));
	}

	#[test]
	fn test_tolerates_cycles_and_bad_edges() {
		let cfg = GraphConfig::default();
		let pos = compute_layout(
			&ids(&["1", "2", "3"]),
			&pairs(&[("1", "2"), ("2", "3"), ("3", "1"), ("2", "2"), ("1", "404")]),
			&cfg,
		);
		assert_eq!(pos.len(), 3);
	}

	#[test]
	fn test_mutual_parents_still_stack() {
		// 1 → 2 → 1: the back edge folds into the forward one.
		let cfg = GraphConfig::default();
		let pos = compute_layout(&ids(&["1", "2"]), &pairs(&[("1", "2"), ("2", "1")]), &cfg);
		assert!(pos["1"].y < pos["2"].y);
		assert_eq!(pos["1"].x, pos["2"].x);
	}

	#[test]
	fn test_married_in_root_sits_above_child() {
		// 1 → 2 → 4 and 3 → 4: 3 joins at 2's generation, not the top row.
		let cfg = GraphConfig::default();
		let pos = compute_layout(
			&ids(&["1", "2", "3", "4"]),
			&pairs(&[("1", "2"), ("2", "4"), ("3", "4")]),
			&cfg,
		);
		assert_eq!(pos["3"].y, pos["2"].y);
		assert!(pos["3"].y < pos["4"].y);
	}

	#[test]
	fn test_never_at_origin() {
		let cfg = GraphConfig::default();
		let pos = compute_layout(&ids(&["1"]), &[], &cfg);
		assert_eq!(pos["1"], Point::new(cfg.margin, cfg.margin));
	}

	#[test]
	fn test_empty_input() {
		assert!(compute_layout(&[], &[], &GraphConfig::default()).is_empty());
	}
}
