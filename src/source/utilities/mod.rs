/// Shard partitioning and key grouping for the map/reduce barrier.
pub mod grouping;
