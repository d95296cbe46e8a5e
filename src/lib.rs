pub mod alignment;
pub mod error;
pub mod io;
pub mod models;
pub mod stages;
pub mod stats;

pub use alignment::{AlignmentConfig, AlignmentRoutine, DialignCommand};
pub use error::{ExtractError, ExtractResult};
pub use io::{
    discover_record_files, format_correlations, parse_record_file, parse_record_json,
    CorrelationReport, TurnTable,
};
pub use models::{
    AlignmentOutput, BatchOutcome, MetricRecord, MetricSeries, MetricSet, Record, Side,
    TaskFailure, TaskResult, TaskState, TurnSequence,
};
pub use stages::{
    collect_quality_scores, execute_stage1, execute_stage2, execute_stage3, load_record,
    process_record, ExtractorConfig,
};
pub use stats::{pearson, Histogram, HistogramConfig};
