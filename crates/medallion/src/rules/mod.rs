//! Rule sets: per-table, per-column cleansing rules.
//!
//! Every rule is total. Malformed input degrades to null, a default or the
//! `n/a` sentinel; it never fails the load.

pub mod dates;
pub mod keys;
pub mod normalize;
pub mod numeric;
mod ruleset;
mod tables;

pub use normalize::{CodeMap, NOT_AVAILABLE};
pub use numeric::{RepairedSales, SalesLine};
pub use ruleset::{
    ColumnRule, ColumnSummary, RowFn, RowPolicy, RuleSet, RuleSetBuilder, RuleSetSummary,
};
pub use tables::{
    CRM_CUST_INFO, CRM_PRD_INFO, CRM_SALES_DETAILS, ERP_CUST_AZ12, ERP_LOC_A101, ERP_PX_CAT_G1V2,
    RuleContext, TABLE_ORDER, crm_cust_info, crm_prd_info, crm_sales_details, erp_cust_az12,
    erp_loc_a101, erp_px_cat_g1v2, rule_set_for, standard_rule_sets,
};
