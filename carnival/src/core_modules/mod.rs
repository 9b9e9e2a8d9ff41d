pub mod activation_map;
pub mod coordinate_mapper;
pub mod guess_scoring;
pub mod inference;
pub mod perturbation;
pub mod point_set;
