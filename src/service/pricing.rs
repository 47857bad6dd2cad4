/// Commission/payout arithmetic, centralized so every write path agrees.
///
/// Rates are basis points (1000 = 10%). Commission rounds down; the owner
/// payout is the remainder, so the split always sums to the total.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSplit {
    pub commission: i64,
    pub owner_payout: i64,
}

pub fn split_amount(total_cents: i64, commission_rate_bp: i64) -> PaymentSplit {
    let commission = total_cents * commission_rate_bp / 10_000;
    PaymentSplit {
        commission,
        owner_payout: total_cents - commission,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_percent_commission() {
        let split = split_amount(1500000, 1000);
        assert_eq!(split.commission, 150000);
        assert_eq!(split.owner_payout, 1350000);
    }

    #[test]
    fn test_commission_rounds_down() {
        // 10% of 10.05 LKR = 100.5 cents -> 100
        let split = split_amount(1005, 1000);
        assert_eq!(split.commission, 100);
        assert_eq!(split.owner_payout, 905);
    }

    #[test]
    fn test_zero_rate_and_zero_amount() {
        assert_eq!(
            split_amount(1500000, 0),
            PaymentSplit { commission: 0, owner_payout: 1500000 }
        );
        assert_eq!(
            split_amount(0, 1000),
            PaymentSplit { commission: 0, owner_payout: 0 }
        );
    }

    #[test]
    fn test_split_always_sums_to_total() {
        for total in [1, 99, 1005, 123456, 99999999] {
            for rate in [0, 250, 1000, 1250, 9999] {
                let split = split_amount(total, rate);
                assert_eq!(split.commission + split.owner_payout, total);
                assert!(split.commission >= 0);
                assert!(split.owner_payout >= 0);
            }
        }
    }
}
