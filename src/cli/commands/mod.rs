pub mod output;
pub mod resource;

pub use resource::run;
