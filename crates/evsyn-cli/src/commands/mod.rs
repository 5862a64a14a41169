pub mod assess;
pub mod bias;
pub mod plot_data;
pub mod pool;
pub mod run;
pub mod sensitivity;
pub mod subgroup;
pub mod version;
