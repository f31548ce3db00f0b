pub mod aggregator;
pub mod engine;
pub mod error;
pub mod table;
pub mod types;

pub use aggregator::{group_by, round2, value_counts, RunningStats};
pub use engine::MetricsEngine;
pub use error::{AnalysisError, AnalysisResult, ErrorKind};
pub use table::{LogTable, REQUIRED_COLUMNS};
pub use types::{
    weekday_name, BasicStats, ErrorAnalysis, ErrorCount, ErrorImpact, ErrorImpactRow,
    HourlyStats, InteractionRecord, Language, LanguageCount, RawInteraction, TokenPoint,
    VisualizationBundle, WeekdayCount, NO_ERROR_SENTINEL,
};
