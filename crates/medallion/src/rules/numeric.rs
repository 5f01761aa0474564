//! Numeric defaults and the sales line repair.

/// Substitute `default` for a missing number.
pub fn or_default(raw: Option<i64>, default: i64) -> i64 {
    raw.unwrap_or(default)
}

/// Integer division that yields `None` instead of dividing by zero.
pub fn safe_div(numerator: Option<i64>, denominator: Option<i64>) -> Option<i64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0 => n.checked_div(d),
        _ => None,
    }
}

/// Raw monetary figures of one sales line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesLine {
    pub sales: Option<i64>,
    pub quantity: Option<i64>,
    pub price: Option<i64>,
}

/// Repaired amount and unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairedSales {
    pub sales: Option<i64>,
    pub price: Option<i64>,
}

impl SalesLine {
    /// `quantity × |price|`, when both are known and the product fits.
    pub fn expected_sales(&self) -> Option<i64> {
        let q = self.quantity?;
        let p = self.price?;
        q.checked_mul(p.checked_abs()?)
    }

    /// A stored amount is valid when positive and, if the price is known,
    /// equal to `quantity × |price|`.
    pub fn sales_is_valid(&self) -> bool {
        match self.sales {
            Some(s) if s > 0 => self.expected_sales().is_none_or(|e| e == s),
            _ => false,
        }
    }

    /// Repair the line. Rows are never dropped, only corrected.
    ///
    /// Amount repair runs first: an invalid amount is replaced by
    /// `quantity × |price|`. Price repair derives `amount ÷ quantity` only from
    /// an amount that was valid as stored. When both are invalid the price is
    /// taken as `|price|`, which is what the repaired amount implies.
    pub fn repair(&self) -> RepairedSales {
        let sales_valid = self.sales_is_valid();
        let sales = if sales_valid {
            self.sales
        } else {
            self.expected_sales()
        };

        let price = match self.price {
            Some(p) if p > 0 => Some(p),
            _ if sales_valid => safe_div(self.sales, self.quantity),
            raw => raw.and_then(i64::checked_abs).filter(|p| *p > 0),
        };

        RepairedSales { sales, price }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sales: Option<i64>, quantity: Option<i64>, price: Option<i64>) -> SalesLine {
        SalesLine {
            sales,
            quantity,
            price,
        }
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default(None, 0), 0);
        assert_eq!(or_default(Some(12), 0), 12);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(Some(30), Some(3)), Some(10));
        assert_eq!(safe_div(Some(30), Some(0)), None);
        assert_eq!(safe_div(None, Some(3)), None);
        assert_eq!(safe_div(Some(i64::MIN), Some(-1)), None);
    }

    #[test]
    fn test_inconsistent_amount_recomputed() {
        let r = line(Some(999), Some(3), Some(10)).repair();
        assert_eq!(r.sales, Some(30));
        assert_eq!(r.price, Some(10));
    }

    #[test]
    fn test_missing_price_recomputed() {
        let r = line(Some(30), Some(3), None).repair();
        assert_eq!(r.sales, Some(30));
        assert_eq!(r.price, Some(10));
    }

    #[test]
    fn test_null_and_negative_amount_recomputed() {
        assert_eq!(line(None, Some(2), Some(5)).repair().sales, Some(10));
        assert_eq!(line(Some(-10), Some(2), Some(5)).repair().sales, Some(10));
        assert_eq!(line(Some(0), Some(2), Some(5)).repair().sales, Some(10));
    }

    #[test]
    fn test_negative_price_uses_absolute_value() {
        let r = line(Some(10), Some(2), Some(-5)).repair();
        assert_eq!(r.sales, Some(10));
        assert_eq!(r.price, Some(5));
    }

    #[test]
    fn test_both_invalid_amount_repair_takes_precedence() {
        // Amount inconsistent and price negative: amount from |price|, price
        // not derived from the bad stored amount.
        let r = line(Some(999), Some(3), Some(-10)).repair();
        assert_eq!(r.sales, Some(30));
        assert_eq!(r.price, Some(10));

        // Nothing to rebuild from.
        let r = line(None, Some(3), None).repair();
        assert_eq!(r.sales, None);
        assert_eq!(r.price, None);
    }

    #[test]
    fn test_zero_quantity_guards_division() {
        let r = line(Some(30), Some(0), None).repair();
        assert_eq!(r.sales, Some(30));
        assert_eq!(r.price, None);
    }

    #[test]
    fn test_consistent_line_untouched() {
        let l = line(Some(40), Some(2), Some(20));
        assert!(l.sales_is_valid());
        assert_eq!(
            l.repair(),
            RepairedSales {
                sales: Some(40),
                price: Some(20)
            }
        );
    }
}
