//! Rule sets for the CRM and ERP source tables.

use chrono::{NaiveDate, Utc};

use super::dates::{not_after, parse_date, parse_yyyymmdd};
use super::keys::{category_id, product_key, remove_separator, strip_prefix};
use super::normalize::{
    COUNTRY, CRM_GENDER, CodeMap, ERP_GENDER, MARITAL_STATUS, PRODUCT_LINE, trimmed,
};
use super::numeric::{SalesLine, or_default};
use super::ruleset::RuleSet;
use crate::error::Result;
use crate::input::SourceRecord;
use crate::schema::{ColumnSchema, ColumnType, Constraint, Value};

pub const CRM_CUST_INFO: &str = "crm_cust_info";
pub const CRM_PRD_INFO: &str = "crm_prd_info";
pub const CRM_SALES_DETAILS: &str = "crm_sales_details";
pub const ERP_CUST_AZ12: &str = "erp_cust_az12";
pub const ERP_LOC_A101: &str = "erp_loc_a101";
pub const ERP_PX_CAT_G1V2: &str = "erp_px_cat_g1v2";

/// Fixed load order. Tables are independent at this layer.
pub const TABLE_ORDER: &[&str] = &[
    CRM_CUST_INFO,
    CRM_PRD_INFO,
    CRM_SALES_DETAILS,
    ERP_CUST_AZ12,
    ERP_LOC_A101,
    ERP_PX_CAT_G1V2,
];

/// Inputs the rules need beyond the raw row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    /// Load date; dates after it are implausible.
    pub as_of: NaiveDate,
}

impl RuleContext {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }
}

impl Default for RuleContext {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

/// Build the rule set for one source table, or `None` if it is unknown.
pub fn rule_set_for(table: &str, ctx: &RuleContext) -> Option<Result<RuleSet>> {
    let rule_set = match table {
        CRM_CUST_INFO => crm_cust_info(),
        CRM_PRD_INFO => crm_prd_info(),
        CRM_SALES_DETAILS => crm_sales_details(),
        ERP_CUST_AZ12 => erp_cust_az12(ctx),
        ERP_LOC_A101 => erp_loc_a101(),
        ERP_PX_CAT_G1V2 => erp_px_cat_g1v2(),
        _ => return None,
    };
    Some(rule_set)
}

/// All rule sets, in load order.
pub fn standard_rule_sets(ctx: &RuleContext) -> Result<Vec<RuleSet>> {
    TABLE_ORDER
        .iter()
        .filter_map(|t| rule_set_for(t, ctx))
        .collect()
}

fn target(table: &str) -> String {
    format!("silver.{}", table)
}

fn text(column: &'static str) -> impl Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static {
    move |r: &SourceRecord<'_>| Value::from_text(trimmed(r.get(column)))
}

fn int(column: &'static str) -> impl Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static {
    move |r: &SourceRecord<'_>| Value::from_int(r.int(column))
}

fn date(column: &'static str) -> impl Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static {
    move |r: &SourceRecord<'_>| Value::from_date(parse_date(r.get(column)))
}

fn encoded_date(
    column: &'static str,
) -> impl Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static {
    move |r: &SourceRecord<'_>| Value::from_date(parse_yyyymmdd(r.int(column)))
}

fn coded(
    column: &'static str,
    codes: CodeMap,
) -> impl Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static {
    move |r: &SourceRecord<'_>| Value::text(codes.expand(r.get(column)))
}

/// Column whose values are restricted to a closed code table.
fn categorical(name: &str, codes: CodeMap) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Text)
        .with_constraint(Constraint::vocabulary(&codes.vocabulary()))
}

fn sales_line(r: &SourceRecord<'_>) -> SalesLine {
    SalesLine {
        sales: r.int("sls_sales"),
        quantity: r.int("sls_quantity"),
        price: r.int("sls_price"),
    }
}

/// CRM customers: one row per customer id, the most recently created.
pub fn crm_cust_info() -> Result<RuleSet> {
    RuleSet::builder(CRM_CUST_INFO, target(CRM_CUST_INFO))
        .requires(&[
            "cst_id",
            "cst_key",
            "cst_firstname",
            "cst_lastname",
            "cst_marital_status",
            "cst_gndr",
            "cst_create_date",
        ])
        .latest_per_key("cst_id", int("cst_id"), "cst_create_date", date("cst_create_date"))
        .column("cst_id", ColumnType::Identifier, int("cst_id"))
        .column("cst_key", ColumnType::Identifier, text("cst_key"))
        .column("cst_firstname", ColumnType::Text, text("cst_firstname"))
        .column("cst_lastname", ColumnType::Text, text("cst_lastname"))
        .column_with(
            categorical("cst_marital_status", MARITAL_STATUS),
            coded("cst_marital_status", MARITAL_STATUS),
        )
        .column_with(categorical("cst_gndr", CRM_GENDER), coded("cst_gndr", CRM_GENDER))
        .column("cst_create_date", ColumnType::Date, date("cst_create_date"))
        .build()
}

/// CRM products: composite key split, cost defaulted, history ranges closed.
pub fn crm_prd_info() -> Result<RuleSet> {
    RuleSet::builder(CRM_PRD_INFO, target(CRM_PRD_INFO))
        .requires(&["prd_id", "prd_key", "prd_nm", "prd_cost", "prd_line", "prd_start_dt"])
        .column("prd_id", ColumnType::Identifier, int("prd_id"))
        .column("cat_id", ColumnType::Identifier, |r: &SourceRecord<'_>| {
            Value::from_text(category_id(r.get("prd_key")))
        })
        .column("prd_key", ColumnType::Identifier, |r: &SourceRecord<'_>| {
            Value::from_text(product_key(r.get("prd_key")))
        })
        .column("prd_nm", ColumnType::Text, text("prd_nm"))
        .column_with(
            ColumnSchema::new("prd_cost", ColumnType::Integer).with_constraint(Constraint::NotNull),
            |r: &SourceRecord<'_>| Value::Integer(or_default(r.int("prd_cost"), 0)),
        )
        .column_with(categorical("prd_line", PRODUCT_LINE), coded("prd_line", PRODUCT_LINE))
        .column("prd_start_dt", ColumnType::Date, date("prd_start_dt"))
        .derived_end("prd_end_dt", "prd_key", "prd_start_dt")
        .build()
}

/// CRM sales lines: integer dates decoded, amount and price repaired.
pub fn crm_sales_details() -> Result<RuleSet> {
    RuleSet::builder(CRM_SALES_DETAILS, target(CRM_SALES_DETAILS))
        .requires(&[
            "sls_ord_num",
            "sls_prd_key",
            "sls_cust_id",
            "sls_order_dt",
            "sls_ship_dt",
            "sls_due_dt",
            "sls_sales",
            "sls_quantity",
            "sls_price",
        ])
        .column("sls_ord_num", ColumnType::Identifier, text("sls_ord_num"))
        .column("sls_prd_key", ColumnType::Identifier, text("sls_prd_key"))
        .column("sls_cust_id", ColumnType::Identifier, int("sls_cust_id"))
        .column("sls_order_dt", ColumnType::Date, encoded_date("sls_order_dt"))
        .column("sls_ship_dt", ColumnType::Date, encoded_date("sls_ship_dt"))
        .column("sls_due_dt", ColumnType::Date, encoded_date("sls_due_dt"))
        .column("sls_sales", ColumnType::Integer, |r: &SourceRecord<'_>| {
            Value::from_int(sales_line(r).repair().sales)
        })
        .column("sls_quantity", ColumnType::Integer, int("sls_quantity"))
        .column("sls_price", ColumnType::Integer, |r: &SourceRecord<'_>| {
            Value::from_int(sales_line(r).repair().price)
        })
        .build()
}

/// ERP customers: key prefix stripped, future birth dates nulled.
pub fn erp_cust_az12(ctx: &RuleContext) -> Result<RuleSet> {
    let as_of = ctx.as_of;
    RuleSet::builder(ERP_CUST_AZ12, target(ERP_CUST_AZ12))
        .requires(&["cid", "bdate", "gen"])
        .column("cid", ColumnType::Identifier, |r: &SourceRecord<'_>| {
            Value::from_text(strip_prefix(r.get("cid"), "NAS"))
        })
        .column("bdate", ColumnType::Date, move |r: &SourceRecord<'_>| {
            Value::from_date(not_after(parse_date(r.get("bdate")), as_of))
        })
        .column_with(categorical("gen", ERP_GENDER), coded("gen", ERP_GENDER))
        .build()
}

/// ERP locations: dashes removed from keys, country codes expanded.
pub fn erp_loc_a101() -> Result<RuleSet> {
    RuleSet::builder(ERP_LOC_A101, target(ERP_LOC_A101))
        .requires(&["cid", "cntry"])
        .column("cid", ColumnType::Identifier, |r: &SourceRecord<'_>| {
            Value::from_text(remove_separator(r.get("cid"), '-'))
        })
        .column_with(
            ColumnSchema::new("cntry", ColumnType::Text).with_constraint(Constraint::NotNull),
            coded("cntry", COUNTRY),
        )
        .build()
}

/// ERP product categories: already clean, copied with trimming.
pub fn erp_px_cat_g1v2() -> Result<RuleSet> {
    RuleSet::builder(ERP_PX_CAT_G1V2, target(ERP_PX_CAT_G1V2))
        .requires(&["id", "cat", "subcat", "maintenance"])
        .column("id", ColumnType::Identifier, text("id"))
        .column("cat", ColumnType::Text, text("cat"))
        .column("subcat", ColumnType::Text, text("subcat"))
        .column("maintenance", ColumnType::Text, text("maintenance"))
        .build()
}
