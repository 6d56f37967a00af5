pub mod charts;
pub mod data;
pub mod model;
pub mod prediction;
pub mod probability;
pub mod validation;
