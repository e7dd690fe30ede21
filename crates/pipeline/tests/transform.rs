mod common;

use std::path::Path;

use chrono::NaiveDate;

use common::{write_csv, HEADERS};
use promoflow_core::columns::derived;
use promoflow_core::{PromotionRecord, SalesCategory};
use promoflow_pipeline::engine::EngineSession;
use promoflow_pipeline::load::load_csv;
use promoflow_pipeline::records::to_records;
use promoflow_pipeline::transform::transform;

async fn transform_rows(dir: &Path, rows: &[Vec<&str>]) -> (Vec<String>, Vec<PromotionRecord>) {
    let path = dir.join("Promotion_data.csv");
    write_csv(&path, &HEADERS, rows);
    let session = EngineSession::start("test");
    let raw = load_csv(&session, &path).await.unwrap();
    let transformed = transform(&session, &raw, "promotion_data_old").await.unwrap();
    let columns = transformed.column_names();
    let records = to_records(&transformed.collect().await.unwrap()).unwrap();
    session.stop();
    (columns, records)
}

fn by_product<'a>(records: &'a [PromotionRecord], product: &str) -> &'a PromotionRecord {
    records
        .iter()
        .find(|r| r.product.as_deref() == Some(product))
        .unwrap_or_else(|| panic!("no record for {product}"))
}

#[tokio::test]
async fn output_columns_follow_reporting_order() {
    let dir = tempfile::tempdir().unwrap();
    let (columns, _) = transform_rows(
        dir.path(),
        &[vec!["2023", "1", "Widget", "10.0", "0.2", "120", "960.0", "300.0", "40", "Yes"]],
    )
    .await;

    assert_eq!(columns, derived::ALL);
}

#[tokio::test]
async fn derives_prices_margins_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let (_, records) = transform_rows(
        dir.path(),
        &[
            vec!["2023", "1", "  widget ", "10.0", "0.2", "120", "960.0", "300.0", "40", "Yes"],
            vec!["2023", "2", "gadget", "3.0", "0.6", "10", "12.0", "0.0", "5", "No"],
            vec!["2023", "3", "freebie", "1.0", "1.0", "10", "0.0", "-2.0", "5", "Maybe"],
        ],
    )
    .await;
    assert_eq!(records.len(), 3);

    let widget = by_product(&records, "WIDGET");
    assert_eq!(widget.discount_percent, Some(20.0));
    assert_eq!(widget.final_unit_price, Some(8.0));
    assert_eq!(widget.gross_margin_percent, Some(31.25));
    assert_eq!(widget.on_flyer_flag, Some(1));
    assert_eq!(widget.high_discount_flag, Some(0));

    let gadget = by_product(&records, "GADGET");
    assert_eq!(gadget.final_unit_price, Some(1.2));
    assert_eq!(gadget.gross_margin_percent, Some(0.0));
    assert_eq!(gadget.on_flyer_flag, Some(0));
    assert_eq!(gadget.high_discount_flag, Some(1));

    let freebie = by_product(&records, "FREEBIE");
    assert_eq!(freebie.gross_margin_percent, None);
    assert_eq!(freebie.on_flyer_flag, Some(0));
    assert_eq!(freebie.final_unit_price, Some(0.0));
}

#[tokio::test]
async fn negative_zero_sales_leaves_margin_percent_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (_, records) = transform_rows(
        dir.path(),
        &[
            vec!["2023", "1", "a", "1.0", "0.0", "1", "-0.0", "0.0", "1", "No"],
            vec!["2023", "1", "b", "1.0", "0.0", "1", "-0.0", "5.0", "1", "No"],
            vec!["2023", "1", "c", "1.0", "0.0", "1", "12.5", "2.5", "1", "No"],
        ],
    )
    .await;

    for product in ["A", "B"] {
        let record = by_product(&records, product);
        assert_eq!(record.sales_dollars, Some(0.0));
        assert_eq!(record.gross_margin_percent, None, "{product}");
    }
    assert_eq!(by_product(&records, "C").gross_margin_percent, Some(20.0));
}

#[tokio::test]
async fn sales_category_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    let (_, records) = transform_rows(
        dir.path(),
        &[
            vec!["2023", "1", "a", "1.0", "0.0", "100", "100.0", "1.0", "1", "No"],
            vec!["2023", "1", "b", "1.0", "0.0", "99", "99.0", "1.0", "1", "No"],
            vec!["2023", "1", "c", "1.0", "0.0", "50", "50.0", "1.0", "1", "No"],
            vec!["2023", "1", "d", "1.0", "0.0", "49", "49.0", "1.0", "1", "No"],
        ],
    )
    .await;

    let category = |p: &str| by_product(&records, p).sales_category;
    assert_eq!(category("A"), Some(SalesCategory::High));
    assert_eq!(category("B"), Some(SalesCategory::Medium));
    assert_eq!(category("C"), Some(SalesCategory::Medium));
    assert_eq!(category("D"), Some(SalesCategory::Low));
}

#[tokio::test]
async fn week_start_is_sunday_of_the_week() {
    let dir = tempfile::tempdir().unwrap();
    let (_, records) = transform_rows(
        dir.path(),
        &[
            vec!["2023", "1", "a", "1.0", "0.0", "1", "1.0", "1.0", "1", "No"],
            vec!["2024", "10", "b", "1.0", "0.0", "1", "1.0", "1.0", "1", "No"],
            vec!["2024", "54", "c", "1.0", "0.0", "1", "1.0", "1.0", "1", "No"],
        ],
    )
    .await;

    assert_eq!(
        by_product(&records, "A").week_start_date,
        NaiveDate::from_ymd_opt(2023, 1, 1)
    );
    assert_eq!(
        by_product(&records, "B").week_start_date,
        NaiveDate::from_ymd_opt(2024, 3, 3)
    );
    assert_eq!(by_product(&records, "C").week_start_date, None);
}
