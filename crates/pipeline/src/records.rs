//! Materialize engine batches into [`PromotionRecord`]s for the sink.

use datafusion::arrow::array::{Array, ArrayRef};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::common::cast::{
    as_date32_array, as_float64_array, as_int64_array, as_string_array,
};

use promoflow_core::calendar::date_from_epoch_days;
use promoflow_core::columns::derived as d;
use promoflow_core::{PromotionRecord, SalesCategory};

use crate::error::PipelineError;

/// Convert the combined dataset's batches to records, in row order.
pub fn to_records(batches: &[RecordBatch]) -> Result<Vec<PromotionRecord>, PipelineError> {
    let total = batches.iter().map(RecordBatch::num_rows).sum();
    let mut records = Vec::with_capacity(total);
    for batch in batches {
        records.extend(batch_records(batch)?);
    }
    Ok(records)
}

fn batch_records(batch: &RecordBatch) -> Result<Vec<PromotionRecord>, PipelineError> {
    let year = int_column(batch, d::YEAR)?;
    let week_number = int_column(batch, d::WEEK_NUMBER)?;
    let product = text_column(batch, d::PRODUCT)?;
    let price = float_column(batch, d::PRICE)?;
    let discount = float_column(batch, d::DISCOUNT)?;
    let discount_percent = float_column(batch, d::DISCOUNT_PERCENT)?;
    let final_unit_price = float_column(batch, d::FINAL_UNIT_PRICE)?;
    let units = int_column(batch, d::UNITS)?;
    let sales_dollars = float_column(batch, d::SALES)?;
    let gross_margin_dollars = float_column(batch, d::GROSS_MARGIN)?;
    let gross_margin_percent = float_column(batch, d::GROSS_MARGIN_PERCENT)?;
    let on_flyer_flag = int_column(batch, d::ON_FLYER_FLAG)?;
    let high_discount_flag = int_column(batch, d::HIGH_DISCOUNT_FLAG)?;
    let sales_category = category_column(batch)?;
    let week_start_date = date_column(batch)?;

    Ok((0..batch.num_rows())
        .map(|i| PromotionRecord {
            year: year[i],
            week_number: week_number[i],
            product: product[i].clone(),
            price: price[i],
            discount: discount[i],
            discount_percent: discount_percent[i],
            final_unit_price: final_unit_price[i],
            units: units[i],
            sales_dollars: sales_dollars[i],
            gross_margin_dollars: gross_margin_dollars[i],
            gross_margin_percent: gross_margin_percent[i],
            on_flyer_flag: on_flyer_flag[i],
            high_discount_flag: high_discount_flag[i],
            sales_category: sales_category[i],
            week_start_date: week_start_date[i],
        })
        .collect())
}

fn column_as(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef, PipelineError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;
    Ok(cast(column, to)?)
}

fn int_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<i64>>, PipelineError> {
    let array = column_as(batch, name, &DataType::Int64)?;
    Ok(as_int64_array(array.as_ref())?.iter().collect())
}

fn float_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>, PipelineError> {
    let array = column_as(batch, name, &DataType::Float64)?;
    Ok(as_float64_array(array.as_ref())?.iter().collect())
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>, PipelineError> {
    let array = column_as(batch, name, &DataType::Utf8)?;
    Ok(as_string_array(array.as_ref())?
        .iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn category_column(batch: &RecordBatch) -> Result<Vec<Option<SalesCategory>>, PipelineError> {
    text_column(batch, d::SALES_CATEGORY)?
        .into_iter()
        .map(|value| {
            value
                .map(|v| {
                    v.parse::<SalesCategory>().map_err(|e| PipelineError::InvalidValue {
                        column: d::SALES_CATEGORY.to_string(),
                        reason: e.to_string(),
                    })
                })
                .transpose()
        })
        .collect()
}

fn date_column(batch: &RecordBatch) -> Result<Vec<Option<chrono::NaiveDate>>, PipelineError> {
    let array = column_as(batch, d::WEEK_START_DATE, &DataType::Date32)?;
    let dates = as_date32_array(array.as_ref())?;
    Ok((0..dates.len())
        .map(|i| {
            if dates.is_null(i) {
                None
            } else {
                date_from_epoch_days(dates.value(i))
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use datafusion::arrow::array::{Date32Array, Float64Array, Int32Array, Int64Array, StringArray};
    use datafusion::arrow::datatypes::{Field, Schema};

    use super::*;

    fn batch(category: &str) -> RecordBatch {
        let ints = |v: Option<i64>| Arc::new(Int64Array::from(vec![v])) as ArrayRef;
        let floats = |v: Option<f64>| Arc::new(Float64Array::from(vec![v])) as ArrayRef;
        let columns: Vec<(&str, ArrayRef)> = vec![
            (d::YEAR, ints(Some(2023))),
            // narrower integer types are widened on the way out
            (d::WEEK_NUMBER, Arc::new(Int32Array::from(vec![Some(2)]))),
            (d::PRODUCT, Arc::new(StringArray::from(vec![Some("WIDGET")]))),
            (d::PRICE, floats(Some(10.0))),
            (d::DISCOUNT, floats(Some(0.2))),
            (d::DISCOUNT_PERCENT, floats(Some(20.0))),
            (d::FINAL_UNIT_PRICE, floats(Some(8.0))),
            (d::UNITS, ints(Some(120))),
            (d::SALES, floats(Some(960.0))),
            (d::GROSS_MARGIN, floats(Some(0.0))),
            (d::GROSS_MARGIN_PERCENT, floats(None)),
            (d::ON_FLYER_FLAG, ints(Some(1))),
            (d::HIGH_DISCOUNT_FLAG, ints(Some(0))),
            (d::SALES_CATEGORY, Arc::new(StringArray::from(vec![Some(category)]))),
            (d::WEEK_START_DATE, Arc::new(Date32Array::from(vec![Some(19365)]))),
        ];
        let schema = Schema::new(
            columns
                .iter()
                .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
                .collect::<Vec<_>>(),
        );
        RecordBatch::try_new(
            Arc::new(schema),
            columns.into_iter().map(|(_, array)| array).collect(),
        )
        .unwrap()
    }

    #[test]
    fn converts_every_column() {
        let records = to_records(&[batch("High")]).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.year, Some(2023));
        assert_eq!(r.week_number, Some(2));
        assert_eq!(r.product.as_deref(), Some("WIDGET"));
        assert_eq!(r.gross_margin_percent, None);
        assert_eq!(r.sales_category, Some(SalesCategory::High));
        assert_eq!(
            r.week_start_date,
            chrono::NaiveDate::from_ymd_opt(2023, 1, 8)
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = to_records(&[batch("Huge")]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidValue { .. }));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let full = batch("Low");
        let without_price = full.project(&[0, 1, 2]).unwrap();
        let err = to_records(&[without_price]).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == d::PRICE));
    }
}
