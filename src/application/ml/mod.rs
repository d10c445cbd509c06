pub mod demand_model;
pub mod evaluation;
pub mod gradient_boosting;
pub mod training;
