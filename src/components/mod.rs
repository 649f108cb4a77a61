pub mod family_graph;
