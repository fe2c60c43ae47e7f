pub mod batch;
mod csv_parser;
pub mod correlation;
pub mod segment_query;
pub mod segmenter;
pub mod window_stats;

pub use batch::{group_by_symbol, run_batch, BatchOptions, BatchReport, PairFailure};
pub use correlation::{
    correlate_participants, join_with_prices, spearman, stock_position_date, JoinedObservation,
    SpearmanResult,
};
pub use csv_parser::{
    load_close_prices, load_price_points, load_segments, load_shareholding, load_trend_configs,
    write_segments, write_segments_to, write_trend_configs,
};
pub use segment_query::{trend_counts, SegmentFilter, TrendCounts};
pub use segmenter::{segment, segment_for_config};
pub use window_stats::{summarize_all, summarize_window, WindowSummary};
