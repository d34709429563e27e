//! Temperature sensor drivers

pub mod mlx90615;
