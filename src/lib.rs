pub mod asset;
pub mod price_row;
pub mod price_store;
pub mod sqlite_store;
pub mod ingest;
pub mod downloader;
pub mod loader;
pub mod returns;
pub mod realized;
pub mod chart;
pub mod forecast;
pub mod config;


pub use asset::AssetId;
pub use price_row::{OhlcvBar, PriceRow, YearMonth};
pub use price_store::{InMemoryPriceStore, PriceStore, StoreError};
pub use sqlite_store::SqlitePriceStore;
pub use ingest::{read_ohlcv_csv, read_ohlcv_csv_path, IngestError};
pub use downloader::{DownloadError, DownloaderConfig, PriceDownloader};
pub use loader::{load_price_rows, sort_chronological, LoadError};
pub use returns::{monthly_average, monthly_returns, MonthlyAverage, MonthlyReturn};
pub use realized::{realized_price, RealizedPricePoint};
pub use chart::{
    long_realized_price_chart, monthly_average_bars, monthly_return_heatmap,
    realized_price_chart, short_realized_price_chart, Bar, BarChart, ChartSeries,
    HeatmapCell, LineChart, ReturnHeatmap, SeriesPoint, SignBucket,
};
pub use forecast::{
    close_observations, forecast_chart, forecast_close, BandPoint, CalendarEvent,
    ForecastChart, ForecastError, ForecastObservation, ForecastPoint,
    ForecastServiceClient, ForecastServiceConfig, SeasonalModel,
};
pub use config::AnalysisConfig;
