pub mod rebuild;
pub mod recommendations;
pub mod sources;

pub use rebuild::build_snapshot;
pub use recommendations::{get_recommendations, RecommendationLimits, RecommendationResponse};
pub use sources::DataSource;
