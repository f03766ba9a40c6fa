use chrono::NaiveDate;
use price_analytics::{
    load_price_rows, monthly_average, monthly_returns, realized_price, sort_chronological,
    AssetId, LoadError, OhlcvBar, PriceStore, SqlitePriceStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_bars() -> Vec<OhlcvBar> {
    let closes = [100.0, 110.0, 121.0, 108.9];
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            OhlcvBar::new(
                AssetId::new(1),
                date(2024, 1, 2) + chrono::Duration::days(i as i64),
                close,
                close,
                close,
                close,
                1.0,
            )
        })
        .collect()
}

#[test]
fn sqlite_pipeline_reproduces_reference_realized_price() {
    let mut store = SqlitePriceStore::new_in_memory().unwrap();
    store.replace_all("prices", &sample_bars()).unwrap();

    let mut rows = load_price_rows(&store, "prices", None, date(2015, 1, 1)).unwrap();
    sort_chronological(&mut rows);

    let series = realized_price(&rows, 2);
    let final_rp = series.last().unwrap().realized_price.unwrap();
    assert!((final_rp - 109.975).abs() < 1e-9);
}

#[test]
fn sqlite_pipeline_monthly_aggregation() {
    let mut store = SqlitePriceStore::new_in_memory().unwrap();
    store.replace_all("prices", &sample_bars()).unwrap();

    let mut rows = load_price_rows(&store, "prices", None, date(2015, 1, 1)).unwrap();
    sort_chronological(&mut rows);

    let returns = monthly_returns(&rows, AssetId::new(1));
    assert_eq!(returns.len(), 1);
    let value = returns[0].monthly_return.unwrap();
    assert!((value - 0.089).abs() < 1e-12);

    let averages = monthly_average(&returns);
    assert_eq!(averages.len(), 1);
    assert_eq!(averages[0].month, 1);
    assert!((averages[0].avg_return.unwrap() - 0.089).abs() < 1e-12);
}

#[test]
fn whole_table_replace_is_observed_atomically() {
    let mut store = SqlitePriceStore::new_in_memory().unwrap();
    store.replace_all("prices", &sample_bars()).unwrap();

    let replacement = vec![OhlcvBar::new(
        AssetId::new(1),
        date(2024, 6, 3),
        50.0,
        50.0,
        50.0,
        50.0,
        2.0,
    )];
    store.replace_all("prices", &replacement).unwrap();

    // Readers see only the replacement, never a mixture.
    let rows = load_price_rows(&store, "prices", None, date(2015, 1, 1)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, date(2024, 6, 3));
    assert_eq!(rows[0].close, 50.0);
}

#[test]
fn start_date_filter_can_empty_the_dataset() {
    let mut store = SqlitePriceStore::new_in_memory().unwrap();
    store.replace_all("prices", &sample_bars()).unwrap();

    let err = load_price_rows(&store, "prices", None, date(2025, 1, 1)).unwrap_err();
    assert_eq!(err, LoadError::DataUnavailable);
}
