mod best_effort_path_ext;
mod readable_size;

pub use best_effort_path_ext::BestEffortPathExt;
pub use readable_size::readable_size;
