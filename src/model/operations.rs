pub mod bind;
pub mod comparison;
pub mod linearize;
pub mod lookup;
