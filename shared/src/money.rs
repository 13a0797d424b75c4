//! 货币格式化
//!
//! 全站金额统一为加元、两位小数、千位分隔。所有页面只许经由这里渲染
//! 金额，避免同一数字在不同页面出现不同格式。

use num_format::{Buffer, Locale};

/// `1234.5` -> `"$1,234.50"`，负数渲染为 `"-$123.45"`
pub fn format_cad(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as i64;
    let dollars = cents / 100;
    let fraction = cents % 100;

    let mut buf = Buffer::default();
    buf.write_formatted(&dollars, &Locale::en);

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{fraction:02}", buf.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_decimals_always() {
        assert_eq!(format_cad(8.0), "$8.00");
        assert_eq!(format_cad(0.5), "$0.50");
    }

    #[test]
    fn thousands_are_separated() {
        assert_eq!(format_cad(1234.5), "$1,234.50");
        assert_eq!(format_cad(1_000_000.0), "$1,000,000.00");
    }

    #[test]
    fn negative_amounts_keep_the_sign_outside() {
        assert_eq!(format_cad(-123.45), "-$123.45");
    }

    #[test]
    fn sub_cent_amounts_round_to_the_nearest_cent() {
        assert_eq!(format_cad(19.999), "$20.00");
        assert_eq!(format_cad(1.004), "$1.00");
        // 四舍后为零的负数不渲染负号
        assert_eq!(format_cad(-0.001), "$0.00");
    }
}
