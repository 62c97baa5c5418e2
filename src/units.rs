//! Display-unit conversion (lakh, crore) and INR formatting

pub const LAKH: f64 = 100_000.0;
pub const CRORE: f64 = 10_000_000.0;

pub fn to_lakh(amount: f64) -> f64 {
    amount / LAKH
}

pub fn to_crore(amount: f64) -> f64 {
    amount / CRORE
}

/// Whole-rupee amount with Indian digit grouping, e.g. `₹1,10,18,023`
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    format!("{}₹{}", sign, group_indian(&digits))
}

/// Short label for cards and chart axes: crores above one crore, else lakhs
pub fn format_inr_compact(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();
    if abs >= CRORE {
        format!("{}₹{:.2} Cr", sign, to_crore(abs))
    } else if abs >= LAKH {
        format!("{}₹{:.2} L", sign, to_lakh(abs))
    } else {
        format_inr(amount)
    }
}

/// Rate as a percentage with two decimals, e.g. `9.06%`
pub fn format_percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

// Last three digits, then groups of two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(1_000.0), "₹1,000");
        assert_eq!(format_inr(100_000.0), "₹1,00,000");
        assert_eq!(format_inr(11_018_023.0), "₹1,10,18,023");
        assert_eq!(format_inr(-472_500.4), "-₹4,72,500");
    }

    #[test]
    fn test_compact() {
        assert_eq!(format_inr_compact(11_018_023.0), "₹1.10 Cr");
        assert_eq!(format_inr_compact(525_000.0), "₹5.25 L");
        assert_eq!(format_inr_compact(-20_000_000.0), "-₹2.00 Cr");
        assert_eq!(format_inr_compact(5_000.0), "₹5,000");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(to_lakh(3_500_000.0), 35.0);
        assert_eq!(to_crore(200_000_000.0), 20.0);
        assert_eq!(format_percent(0.0906), "9.06%");
    }
}
