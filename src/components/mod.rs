pub mod route_graph;
