mod name_heuristic;

pub use name_heuristic::NameHeuristic;
