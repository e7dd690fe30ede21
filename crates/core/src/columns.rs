//! Column catalog for the promotion spreadsheets.
//!
//! [`raw`] holds the headers exactly as exported from the spreadsheets,
//! [`derived`] the identifier-safe names produced by the transformer.

/// Headers as they appear in the source spreadsheets.
pub mod raw {
    pub const YEAR: &str = "Year";
    pub const WEEK_NUMBER: &str = "week number";
    pub const PRODUCT: &str = "Product";
    pub const PRICE: &str = "Price";
    pub const DISCOUNT: &str = "Discount";
    pub const UNITS: &str = "Units";
    pub const SALES: &str = "Sales $";
    pub const GROSS_MARGIN: &str = "Gross Margin $";
    pub const TRANSACTIONS: &str = "# Transactions that contained the product";
    pub const ON_FLYER: &str = "On Flyer?";

    /// Numeric columns that must never hold a negative value.
    pub const NON_NEGATIVE: [&str; 6] = [PRICE, DISCOUNT, UNITS, SALES, GROSS_MARGIN, TRANSACTIONS];

    /// Values accepted in the [`ON_FLYER`] column.
    pub const FLAG_DOMAIN: [&str; 2] = ["Yes", "No"];
}

/// Column names of a transformed dataset, in output order.
pub mod derived {
    pub const YEAR: &str = "Year";
    pub const WEEK_NUMBER: &str = "week_number";
    pub const PRODUCT: &str = "Product";
    pub const PRICE: &str = "Price";
    pub const DISCOUNT: &str = "Discount";
    pub const DISCOUNT_PERCENT: &str = "Discount_Percent";
    pub const FINAL_UNIT_PRICE: &str = "Final_Unit_Price";
    pub const UNITS: &str = "Units";
    pub const SALES: &str = "Sales_dollars";
    pub const GROSS_MARGIN: &str = "Gross_Margin_dollars";
    pub const GROSS_MARGIN_PERCENT: &str = "Gross_Margin_Percent";
    pub const ON_FLYER_FLAG: &str = "On_Flyer_Flag";
    pub const HIGH_DISCOUNT_FLAG: &str = "High_Discount_Flag";
    pub const SALES_CATEGORY: &str = "Sales_Category";
    pub const WEEK_START_DATE: &str = "Week_Start_Date";

    /// Normalized name of the raw `On Flyer?` column before the flag is derived.
    pub const ON_FLYER: &str = "On_Flyer";

    pub const ALL: [&str; 15] = [
        YEAR,
        WEEK_NUMBER,
        PRODUCT,
        PRICE,
        DISCOUNT,
        DISCOUNT_PERCENT,
        FINAL_UNIT_PRICE,
        UNITS,
        SALES,
        GROSS_MARGIN,
        GROSS_MARGIN_PERCENT,
        ON_FLYER_FLAG,
        HIGH_DISCOUNT_FLAG,
        SALES_CATEGORY,
        WEEK_START_DATE,
    ];
}

/// Turn a spreadsheet header into an identifier-safe column name.
///
/// Trims, then maps space to `_`, drops `?`, spells `$` as `dollars` and
/// `#` as `num`. Any other character outside `[A-Za-z0-9_]` becomes `_`.
pub fn normalize_column_name(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    for ch in header.trim().chars() {
        match ch {
            ' ' => out.push('_'),
            '?' => {}
            '$' => out.push_str("dollars"),
            '#' => out.push_str("num"),
            c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            _ => out.push('_'),
        }
    }
    out
}

/// Quote a column or view name for use in a SQL statement.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string value as a SQL literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
