//! # Bulk Import Parsing
//!
//! Spreadsheet uploads arrive as CSV with a header row. Each row is
//! deserialized into a typed record; the first row that fails to parse
//! aborts the whole import with an error naming the row, matching the
//! all-or-nothing transaction on the storage side.

use serde::Deserialize;

use crate::error::ApiError;
use tillpoint_core::{CoreError, Money, StockAction};
use tillpoint_db::repository::product::ProductInput;
use tillpoint_db::repository::stock::{StockAdjustmentInput, StockInInput};

// =============================================================================
// Row Shapes
// =============================================================================

/// One product row: barcode, name, description, supplier/retail/wholesale
/// price (cents), reorder level, VAT flag, status, optional category.
#[derive(Debug, Deserialize)]
struct ProductRow {
    barcode: String,
    name: String,
    description: Option<String>,
    supplier_price_cents: i64,
    retail_price_cents: i64,
    wholesale_price_cents: i64,
    reorder_level: i64,
    is_vat: i64,
    status: i64,
    category_id: Option<i64>,
}

/// One stock-in row, in the upstream worksheet's column order.
#[derive(Debug, Deserialize)]
struct StockInRow {
    user_id: i64,
    supplier_id: i64,
    product_id: i64,
    units: i64,
    location_id: i64,
    status: i64,
}

/// One stock adjustment row.
#[derive(Debug, Deserialize)]
struct AdjustmentRow {
    product_id: i64,
    units: i64,
    reason: String,
    user_id: i64,
    location_id: i64,
    action: i64,
}

// =============================================================================
// Parsers
// =============================================================================

fn bad_row(row: usize, err: impl std::fmt::Display) -> ApiError {
    // +2: one for the header row, one because enumerate is zero-based
    ApiError::BadRequest(format!("Invalid row {}: {}", row + 2, err))
}

/// Parses a product import file.
pub fn parse_products(data: &[u8]) -> Result<Vec<ProductInput>, ApiError> {
    let mut reader = csv::Reader::from_reader(data);
    let mut inputs = Vec::new();

    for (i, record) in reader.deserialize::<ProductRow>().enumerate() {
        let row = record.map_err(|e| bad_row(i, e))?;
        inputs.push(ProductInput {
            barcode: row.barcode,
            name: row.name,
            description: row.description,
            supplier_price_cents: Money::from_cents(row.supplier_price_cents),
            retail_price_cents: Money::from_cents(row.retail_price_cents),
            wholesale_price_cents: Money::from_cents(row.wholesale_price_cents),
            reorder_level: row.reorder_level,
            is_vat: row.is_vat,
            status: row.status,
            category_id: row.category_id,
        });
    }

    if inputs.is_empty() {
        return Err(ApiError::BadRequest("No rows to import".to_string()));
    }

    Ok(inputs)
}

/// Parses a stock-in import file.
pub fn parse_stock_ins(data: &[u8]) -> Result<Vec<StockInInput>, ApiError> {
    let mut reader = csv::Reader::from_reader(data);
    let mut inputs = Vec::new();

    for (i, record) in reader.deserialize::<StockInRow>().enumerate() {
        let row = record.map_err(|e| bad_row(i, e))?;
        inputs.push(StockInInput {
            supplier_id: row.supplier_id,
            product_id: row.product_id,
            location_id: row.location_id,
            units: row.units,
            user_id: row.user_id,
            status: row.status,
        });
    }

    if inputs.is_empty() {
        return Err(ApiError::BadRequest("No rows to import".to_string()));
    }

    Ok(inputs)
}

/// Parses a stock adjustment import file.
pub fn parse_adjustments(data: &[u8]) -> Result<Vec<StockAdjustmentInput>, ApiError> {
    let mut reader = csv::Reader::from_reader(data);
    let mut inputs = Vec::new();

    for (i, record) in reader.deserialize::<AdjustmentRow>().enumerate() {
        let row = record.map_err(|e| bad_row(i, e))?;
        let action = StockAction::from_code(row.action)
            .ok_or_else(|| bad_row(i, CoreError::InvalidStockAction(row.action)))?;
        inputs.push(StockAdjustmentInput {
            product_id: row.product_id,
            units: row.units,
            reason: row.reason,
            user_id: row.user_id,
            location_id: row.location_id,
            action,
        });
    }

    if inputs.is_empty() {
        return Err(ApiError::BadRequest("No rows to import".to_string()));
    }

    Ok(inputs)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stock_ins() {
        let data = b"user_id,supplier_id,product_id,units,location_id,status\n\
                     2,1,10,24,1,1\n\
                     2,1,11,6,1,1\n";

        let rows = parse_stock_ins(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, 10);
        assert_eq!(rows[0].units, 24);
        assert_eq!(rows[1].product_id, 11);
    }

    #[test]
    fn test_parse_stock_ins_typed_field_failure() {
        let data = b"user_id,supplier_id,product_id,units,location_id,status\n\
                     2,1,10,24,1,1\n\
                     2,1,eleven,6,1,1\n";

        let err = parse_stock_ins(data).unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("row 3"), "got: {message}");
    }

    #[test]
    fn test_parse_adjustments_action_check() {
        let data = b"product_id,units,reason,user_id,location_id,action\n\
                     10,5,Damaged,2,1,7\n";

        assert!(parse_adjustments(data).is_err());

        let data = b"product_id,units,reason,user_id,location_id,action\n\
                     10,5,Damaged,2,1,1\n";
        let rows = parse_adjustments(data).unwrap();
        assert_eq!(rows[0].action, StockAction::Remove);
    }

    #[test]
    fn test_parse_products() {
        let data = b"barcode,name,description,supplier_price_cents,retail_price_cents,wholesale_price_cents,reorder_level,is_vat,status,category_id\n\
                     4800300,Rice 1kg,,4500,6000,5500,20,0,1,\n";

        let rows = parse_products(data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].barcode, "4800300");
        assert_eq!(rows[0].retail_price_cents.cents(), 6000);
        assert_eq!(rows[0].category_id, None);
    }

    #[test]
    fn test_empty_file_rejected() {
        let data = b"user_id,supplier_id,product_id,units,location_id,status\n";
        assert!(parse_stock_ins(data).is_err());
    }
}
