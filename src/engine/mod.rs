pub mod ab_join;
pub mod distance;
pub mod self_join;
pub mod sliding_dot;
